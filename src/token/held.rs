//! Held-token state: the validity gate and the holder handle the dispatcher owns.

// self
use crate::{_prelude::*, token::record::BearerToken};

/// Cached-credential reference evaluated by the validity gate.
///
/// The gate pattern-matches on the variant, never on field shape: a value that
/// looks like a token but did not pass through [`BearerToken`] construction lands
/// in [`HeldToken::Malformed`] and always triggers a refresh, whatever its fields
/// claim about expiry.
#[derive(Clone, Default)]
pub enum HeldToken {
	/// No credential has been cached yet.
	#[default]
	Absent,
	/// A credential minted through [`BearerToken`] construction.
	Genuine(BearerToken),
	/// An untrusted value that was never validated into a credential.
	Malformed(serde_json::Value),
}
impl HeldToken {
	/// Wraps an untrusted value without promoting it, whatever its shape.
	///
	/// Even a payload carrying plausible `accessToken`/`expiresAt` fields stays
	/// [`HeldToken::Malformed`]; promotion to [`HeldToken::Genuine`] happens only
	/// through the refresh path.
	pub fn from_untrusted(value: serde_json::Value) -> Self {
		Self::Malformed(value)
	}

	/// Validity gate: `true` when a refresh must occur before dispatch.
	pub fn needs_refresh_at(&self, instant: OffsetDateTime) -> bool {
		match self {
			Self::Absent | Self::Malformed(_) => true,
			Self::Genuine(token) => token.is_expired_at(instant),
		}
	}

	/// Evaluates the gate against the current clock.
	pub fn needs_refresh(&self) -> bool {
		self.needs_refresh_at(OffsetDateTime::now_utc())
	}

	/// Returns the genuine credential when the gate passes at `instant`.
	pub fn usable_at(&self, instant: OffsetDateTime) -> Option<&BearerToken> {
		match self {
			Self::Genuine(token) if !token.is_expired_at(instant) => Some(token),
			_ => None,
		}
	}
}
impl Debug for HeldToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		// Untrusted payloads may carry stale secrets; never print them.
		match self {
			Self::Absent => f.write_str("HeldToken::Absent"),
			Self::Genuine(token) => f.debug_tuple("HeldToken::Genuine").field(token).finish(),
			Self::Malformed(_) =>
				f.debug_tuple("HeldToken::Malformed").field(&"<untrusted>").finish(),
		}
	}
}

/// Exclusively-owned handle around the held token, injected into the dispatcher
/// at construction.
///
/// Replacement is always wholesale; there is no partial mutation, and a failed
/// refresh never touches the stored state.
#[derive(Debug, Default)]
pub struct TokenHolder(RwLock<HeldToken>);
impl TokenHolder {
	/// Creates a holder seeded with the provided state.
	pub fn new(held: HeldToken) -> Self {
		Self(RwLock::new(held))
	}

	/// Returns a clone of the current held state.
	pub fn snapshot(&self) -> HeldToken {
		self.0.read().clone()
	}

	/// Evaluates the validity gate at `instant`.
	pub fn needs_refresh_at(&self, instant: OffsetDateTime) -> bool {
		self.0.read().needs_refresh_at(instant)
	}

	/// Returns the genuine credential when it passes the gate at `instant`.
	pub fn usable_at(&self, instant: OffsetDateTime) -> Option<BearerToken> {
		self.0.read().usable_at(instant).cloned()
	}

	/// Installs a freshly minted credential, replacing the held state wholesale.
	pub fn install(&self, token: BearerToken) {
		*self.0.write() = HeldToken::Genuine(token);
	}

	/// Replaces the held state wholesale.
	pub fn replace(&self, held: HeldToken) {
		*self.0.write() = held;
	}
}
