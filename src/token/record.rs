//! Genuine bearer credential with an absolute expiry.

// self
use crate::{_prelude::*, token::secret::TokenSecret};

/// Bearer credential minted by a refresh operation.
///
/// Construction is the capability: the type deliberately implements no `Deserialize`,
/// so a value that merely shares this shape (a cached JSON record, an ad hoc map)
/// cannot become a `BearerToken` without passing through a constructor. The refresh
/// path is the only producer in normal operation.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
	access_token: TokenSecret,
	expires_at: OffsetDateTime,
}
impl BearerToken {
	/// Mints a credential with an absolute expiry instant.
	pub fn new(access_token: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { access_token: TokenSecret::new(access_token), expires_at }
	}

	/// Mints a credential that expires `valid_for` after `issued_at`.
	pub fn with_expires_in(
		access_token: impl Into<String>,
		issued_at: OffsetDateTime,
		valid_for: Duration,
	) -> Self {
		Self::new(access_token, issued_at + valid_for)
	}

	/// Returns the redacted access secret.
	pub fn access_token(&self) -> &TokenSecret {
		&self.access_token
	}

	/// Returns the absolute expiry instant.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.expires_at
	}

	/// Returns `true` when the credential must not be used at the provided instant.
	///
	/// The boundary is inclusive: a credential is already expired at its exact
	/// `expires_at` instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` when the credential is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Formats the `Authorization` header value carrying this credential.
	pub fn authorization_value(&self) -> String {
		format!("Bearer {}", self.access_token.expose())
	}
}
impl Debug for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BearerToken")
			.field("access_token", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
