//! API-request transport seam and the default reqwest implementation.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use http::{Request, Response};
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`ApiTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Response<Vec<u8>>, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports that execute already-shaped API requests.
///
/// The dispatcher finishes all gating and header construction before this seam,
/// so implementations only move bytes: execute the request and hand back the raw
/// response unchanged. Implementations must be `Send + Sync + 'static` so one
/// transport can serve concurrent dispatches without extra wrappers.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes the request and returns the response unchanged.
	fn execute(&self, request: Request<Vec<u8>>) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	async fn execute_once(
		&self,
		request: Request<Vec<u8>>,
	) -> Result<Response<Vec<u8>>, TransportError> {
		let response =
			self.0.execute(request.try_into().map_err(TransportError::network)?).await?;
		let status = response.status();
		let headers = response.headers().to_owned();
		let mut rebuilt = Response::new(response.bytes().await?.to_vec());

		*rebuilt.status_mut() = status;
		*rebuilt.headers_mut() = headers;

		Ok(rebuilt)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn execute(&self, request: Request<Vec<u8>>) -> TransportFuture<'_> {
		Box::pin(self.execute_once(request))
	}
}
