//! Refresh collaborator contracts plus the wire payload spoken by token endpoints.

#[cfg(feature = "reqwest")] pub mod http;
#[cfg(feature = "reqwest")] pub use self::http::HttpTokenSource;

// self
use crate::{_prelude::*, error::RefreshError, token::BearerToken};

/// Boxed future returned by [`TokenSource::issue`].
pub type SourceFuture<'a> =
	Pin<Box<dyn Future<Output = Result<BearerToken, RefreshError>> + 'a + Send>>;

/// Remote token-issuing collaborator contract.
///
/// Implementations own the refresh protocol end to end; the dispatcher only
/// requires that every successful call mints a genuine [`BearerToken`] whose
/// expiry is strictly in the future. Each invocation performs the remote work
/// again, so repeated calls are wasteful rather than incorrect.
pub trait TokenSource
where
	Self: 'static + Send + Sync,
{
	/// Performs one refresh round trip and mints a replacement credential.
	fn issue(&self) -> SourceFuture<'_>;
}

/// Wire payload returned by JSON token endpoints.
#[derive(Debug, Deserialize)]
pub struct TokenPayload {
	/// Access token value issued by the endpoint.
	pub access_token: String,
	/// Relative expiry in seconds, when supplied.
	pub expires_in: Option<i64>,
}
impl TokenPayload {
	// Ten years; anything beyond this is a provider bug, not a credential.
	const MAX_EXPIRES_IN_SECS: i64 = 10 * 365 * 24 * 60 * 60;

	/// Parses a raw JSON body, preserving the failing path on malformed payloads.
	pub fn from_json(bytes: &[u8], status: Option<u16>) -> Result<Self, RefreshError> {
		let mut deserializer = serde_json::Deserializer::from_slice(bytes);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| RefreshError::ResponseParse { source, status })
	}

	/// Validates the payload and mints a credential expiring strictly after `issued_at`.
	pub fn into_token(self, issued_at: OffsetDateTime) -> Result<BearerToken, RefreshError> {
		let secs = self.expires_in.ok_or(RefreshError::MissingExpiresIn)?;

		if secs <= 0 {
			return Err(RefreshError::NonPositiveExpiresIn);
		}
		if secs > Self::MAX_EXPIRES_IN_SECS {
			return Err(RefreshError::ExpiresInOutOfRange);
		}

		Ok(BearerToken::with_expires_in(self.access_token, issued_at, Duration::seconds(secs)))
	}
}
