//! Reqwest-backed [`TokenSource`] speaking a JSON token endpoint.

// self
use crate::{
	_prelude::*,
	error::RefreshError,
	source::{SourceFuture, TokenPayload, TokenSource},
	token::BearerToken,
};

/// Token source that POSTs static form credentials to a single endpoint URL.
///
/// The endpoint is expected to answer `{"access_token": ..., "expires_in": ...}`;
/// anything else surfaces as a [`RefreshError`] and leaves the caller's held
/// token untouched. Callers speaking a different refresh protocol implement
/// [`TokenSource`] themselves.
#[derive(Clone)]
pub struct HttpTokenSource {
	endpoint: Url,
	client: ReqwestClient,
	form: Vec<(String, String)>,
}
impl HttpTokenSource {
	/// Creates a source for the provided token endpoint with a default client.
	pub fn new(endpoint: Url) -> Self {
		Self { endpoint, client: ReqwestClient::default(), form: Vec::new() }
	}

	/// Replaces the underlying reqwest client.
	pub fn with_client(mut self, client: ReqwestClient) -> Self {
		self.client = client;

		self
	}

	/// Adds a static form parameter sent on every refresh call, e.g. client credentials
	/// or a long-lived refresh secret.
	pub fn with_form_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.form.push((key.into(), value.into()));

		self
	}

	async fn issue_once(&self) -> Result<BearerToken, RefreshError> {
		let response = self
			.client
			.post(self.endpoint.clone())
			.form(&self.form)
			.send()
			.await
			.map_err(RefreshError::network)?;
		let status = response.status().as_u16();
		let body = response.bytes().await.map_err(RefreshError::network)?;

		if !(200..300).contains(&status) {
			return Err(RefreshError::TokenEndpoint {
				message: String::from_utf8_lossy(&body).into_owned(),
				status: Some(status),
			});
		}

		let issued_at = OffsetDateTime::now_utc();

		TokenPayload::from_json(&body, Some(status))?.into_token(issued_at)
	}
}
impl TokenSource for HttpTokenSource {
	fn issue(&self) -> SourceFuture<'_> {
		Box::pin(self.issue_once())
	}
}
impl Debug for HttpTokenSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		// Form parameters may carry client credentials; print keys only.
		f.debug_struct("HttpTokenSource")
			.field("endpoint", &self.endpoint.as_str())
			.field("form_keys", &self.form.iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>())
			.finish()
	}
}
