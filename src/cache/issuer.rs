//! Token issuance contract the cache calls on a miss or expiry.

// self
use crate::{_prelude::*, cache::CacheKey};

/// Boxed future returned by [`TokenIssuer::issue`].
pub type IssueFuture<'a, E> = Pin<Box<dyn Future<Output = Result<String, E>> + 'a + Send>>;

/// Produces fresh access tokens for a cache key.
///
/// The cache treats the issuer as opaque: whatever protocol mints the token (a token endpoint,
/// a signing service, a static secret) lives behind this trait. Errors are surfaced to the
/// caller of [`TokenCache::get_token`](crate::cache::TokenCache::get_token) unchanged and are
/// never cached.
pub trait TokenIssuer
where
	Self: 'static + Send + Sync,
{
	/// Failure reported when a token cannot be produced.
	type Error: 'static + Send + Sync + StdError;

	/// Issues a new token for `key`.
	fn issue<'a>(&'a self, key: &'a CacheKey) -> IssueFuture<'a, Self::Error>;
}

/// Adapts a synchronous closure into a [`TokenIssuer`].
pub struct FnTokenIssuer<F>(F);
impl<F> FnTokenIssuer<F> {
	/// Wraps the provided closure.
	pub fn new(f: F) -> Self {
		Self(f)
	}
}
impl<F, E> TokenIssuer for FnTokenIssuer<F>
where
	F: 'static + Send + Sync + Fn(&CacheKey) -> Result<String, E>,
	E: 'static + Send + Sync + StdError,
{
	type Error = E;

	fn issue<'a>(&'a self, key: &'a CacheKey) -> IssueFuture<'a, Self::Error> {
		let issued = (self.0)(key);

		Box::pin(async move { issued })
	}
}
impl<F> Debug for FnTokenIssuer<F> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FnTokenIssuer(..)")
	}
}
