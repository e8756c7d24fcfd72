//! Access token secret and the immutable cache entry that carries it.

// self
use crate::_prelude::*;

/// Redacted access token wrapper keeping credentials out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(String);
impl AccessToken {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for AccessToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AccessToken").field(&"<redacted>").finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Cached token plus its validity window.
///
/// Entries are never mutated once built; the cache swaps in a new `Arc<TokenEntry>` when the
/// current one expires.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenEntry {
	/// Access token secret.
	pub token: AccessToken,
	/// Instant the token was issued by the cache.
	pub issued_at: OffsetDateTime,
	/// Instant from which the token is no longer served.
	pub expires_at: OffsetDateTime,
}
impl TokenEntry {
	/// Creates an entry that stays usable for `ttl` after `issued_at`.
	pub fn new(token: AccessToken, issued_at: OffsetDateTime, ttl: Duration) -> Self {
		Self { token, issued_at, expires_at: issued_at + ttl }
	}

	/// Returns `true` if the entry may be served at the provided instant.
	pub fn is_usable_at(&self, instant: OffsetDateTime) -> bool {
		instant < self.expires_at
	}

	/// Returns `true` if the entry is usable relative to the current clock.
	pub fn is_usable(&self) -> bool {
		self.is_usable_at(OffsetDateTime::now_utc())
	}

	/// Time left before expiry at the provided instant, clamped at zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl Debug for TokenEntry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenEntry")
			.field("token", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
