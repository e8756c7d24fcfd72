//! Opaque cache key identifying a credential scope (merchant, account, ...).

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

/// Error returned when cache key validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum CacheKeyError {
	/// The key was empty.
	#[error("Cache key cannot be empty.")]
	Empty,
}

/// Opaque identifier for one cached credential (e.g. a merchant id).
///
/// Any non-empty string is accepted verbatim; keys are compared byte for byte.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CacheKey(String);
impl CacheKey {
	/// Creates a new key, rejecting only the empty string.
	pub fn new(value: impl AsRef<str>) -> Result<Self, CacheKeyError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for CacheKey {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for CacheKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for CacheKey {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<CacheKey> for String {
	fn from(value: CacheKey) -> Self {
		value.0
	}
}
impl TryFrom<String> for CacheKey {
	type Error = CacheKeyError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for CacheKey {
	type Err = CacheKeyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "CacheKey({})", self.0)
	}
}
impl Display for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate_view(view: &str) -> Result<(), CacheKeyError> {
	if view.is_empty() {
		return Err(CacheKeyError::Empty);
	}

	Ok(())
}
