//! Request dispatcher that gates API calls on bearer-token freshness.
//!
//! [`BearerClient::request`] evaluates the validity gate before every `api`-flagged
//! dispatch, funnels refreshes through a single-flight guard so concurrent callers
//! share one token-endpoint round trip, and attaches the resulting credential as an
//! `Authorization: Bearer` header. Requests without the `api` flag bypass the gate
//! entirely and carry no credential.

mod metrics;

pub use metrics::GateMetrics;

// crates.io
use http::{
	Method, Request, Response,
	header::{AUTHORIZATION, HeaderValue},
};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	obs::{self, ClientOp, OpOutcome, OpSpan},
	source::TokenSource,
	token::{BearerToken, HeldToken, TokenHolder},
	transport::ApiTransport,
};
#[cfg(feature = "reqwest")]
use crate::{source::HttpTokenSource, transport::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestBearerClient = BearerClient<ReqwestTransport, HttpTokenSource>;

/// Per-call configuration recognized by [`BearerClient::request`].
///
/// `api` is the only flag that influences the gate; all other request shaping
/// stays with the caller.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
	/// Gates the request on token freshness and attaches the credential header.
	pub api: bool,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
}
impl RequestOptions {
	/// Creates options with every flag unset.
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks the request as targeting the authenticated API surface.
	pub fn api(mut self) -> Self {
		self.api = true;

		self
	}

	/// Overrides the API flag.
	pub fn with_api(mut self, api: bool) -> Self {
		self.api = api;

		self
	}

	/// Attaches a request body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}
}

/// Dispatches HTTP requests, refreshing the held bearer token when the gate demands it.
///
/// The client owns the token holder outright, so the credential's lifecycle is
/// visible in the construction signature instead of living in process-wide state.
pub struct BearerClient<T, S>
where
	T: ?Sized + ApiTransport,
	S: ?Sized + TokenSource,
{
	/// Transport used for every outbound API request.
	pub transport: Arc<T>,
	/// Refresh collaborator that mints replacement credentials.
	pub source: Arc<S>,
	/// Shared counters describing gate decisions and refresh outcomes.
	pub gate_metrics: Arc<GateMetrics>,
	base_url: Url,
	holder: TokenHolder,
	refresh_guard: AsyncMutex<()>,
}
impl<T, S> BearerClient<T, S>
where
	T: ?Sized + ApiTransport,
	S: ?Sized + TokenSource,
{
	/// Creates a client that reuses the caller-provided transport + source pair.
	pub fn with_transport(
		base_url: Url,
		transport: impl Into<Arc<T>>,
		source: impl Into<Arc<S>>,
	) -> Self {
		Self {
			transport: transport.into(),
			source: source.into(),
			gate_metrics: Default::default(),
			base_url,
			holder: TokenHolder::default(),
			refresh_guard: AsyncMutex::new(()),
		}
	}

	/// Seeds the injected holder with an initial held state.
	pub fn with_held_token(self, held: HeldToken) -> Self {
		self.holder.replace(held);

		self
	}

	/// Returns a clone of the current held-token state.
	pub fn held_token(&self) -> HeldToken {
		self.holder.snapshot()
	}

	/// Dispatches `method path`, gating on token freshness when `options.api` is set.
	///
	/// A stale credential is never dispatched speculatively: when the gate fails,
	/// the refresh completes before the request is built.
	pub async fn request(
		&self,
		method: Method,
		path: &str,
		options: RequestOptions,
	) -> Result<Response<Vec<u8>>> {
		const OP: ClientOp = ClientOp::Dispatch;

		let span = OpSpan::new(OP, "request");

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self
					.base_url
					.join(path)
					.map_err(|source| ConfigError::InvalidPath { source })?;
				let mut builder = Request::builder().method(method).uri(url.as_str());

				if options.api {
					let token = self.ensure_fresh().await?;
					let mut value = HeaderValue::from_str(&token.authorization_value())
						.map_err(|source| ConfigError::CredentialNotHeaderSafe { source })?;

					value.set_sensitive(true);

					builder = builder.header(AUTHORIZATION, value);
				}

				let request =
					builder.body(options.body.unwrap_or_default()).map_err(ConfigError::from)?;

				Ok(self.transport.execute(request).await?)
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(OP, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(OP, OpOutcome::Failure),
		}

		result
	}

	/// Guarantees a gate-passing credential, refreshing through the single-flight guard.
	///
	/// The holder is re-checked after the guard is acquired: a concurrent flight may
	/// already have installed a fresh credential while this caller waited, in which
	/// case the source is not contacted again.
	pub async fn ensure_fresh(&self) -> Result<BearerToken> {
		self.gate_metrics.record_gate();

		if let Some(token) = self.holder.usable_at(OffsetDateTime::now_utc()) {
			self.gate_metrics.record_reuse();

			return Ok(token);
		}

		let _flight = self.refresh_guard.lock().await;

		if let Some(token) = self.holder.usable_at(OffsetDateTime::now_utc()) {
			self.gate_metrics.record_reuse();

			return Ok(token);
		}

		self.refresh_locked().await
	}

	/// Unconditionally refreshes the held token, replacing it wholesale on success.
	///
	/// Always yields a valid credential but repeats the remote work on every call;
	/// callers wanting cache reuse go through [`BearerClient::ensure_fresh`].
	pub async fn refresh_token_now(&self) -> Result<BearerToken> {
		let _flight = self.refresh_guard.lock().await;

		self.refresh_locked().await
	}

	async fn refresh_locked(&self) -> Result<BearerToken> {
		const OP: ClientOp = ClientOp::Refresh;

		let span = OpSpan::new(OP, "refresh_locked");

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				match self.source.issue().await {
					Ok(token) => {
						self.holder.install(token.clone());
						self.gate_metrics.record_refresh();

						Ok(token)
					},
					Err(err) => {
						// Holder stays untouched so a later call can retry.
						self.gate_metrics.record_failure();

						Err(Error::RefreshFailed(err))
					},
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(OP, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(OP, OpOutcome::Failure),
		}

		result
	}
}
#[cfg(feature = "reqwest")]
impl BearerClient<ReqwestTransport, HttpTokenSource> {
	/// Creates a client with the default reqwest transport and an HTTP token source
	/// pointed at `token_endpoint`.
	pub fn new(base_url: Url, token_endpoint: Url) -> Self {
		Self::with_transport(
			base_url,
			ReqwestTransport::default(),
			HttpTokenSource::new(token_endpoint),
		)
	}
}
impl<T, S> Debug for BearerClient<T, S>
where
	T: ?Sized + ApiTransport,
	S: ?Sized + TokenSource,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BearerClient")
			.field("base_url", &self.base_url.as_str())
			.field("held_token", &self.holder.snapshot())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn options_builder_sets_flags() {
		let options = RequestOptions::new();

		assert!(!options.api);
		assert!(options.body.is_none());

		let options = RequestOptions::new().api().with_body(b"payload".to_vec());

		assert!(options.api);
		assert_eq!(options.body.as_deref(), Some(b"payload".as_slice()));
		assert!(!RequestOptions::new().api().with_api(false).api);
	}
}
