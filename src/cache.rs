//! In-memory access token cache with TTL expiry and per-key single-flight regeneration.
//!
//! [`TokenCache::get_token`] serves a live entry straight from a read lock. On a miss or after
//! expiry the caller takes the key's guard, re-checks the entry (another caller may have
//! refreshed it while this one waited), and only then asks the [`TokenIssuer`] for a new token.
//! Concurrent callers for the same expired key therefore share one issuance, while callers for
//! different keys never wait on each other. The map lock is never held across an `.await`, and a
//! key's guard is dropped from the map once no caller holds or waits on it.

pub mod issuer;
pub mod key;
pub mod token;

mod metrics;

pub use issuer::*;
pub use key::*;
pub use metrics::CacheMetrics;
pub use token::*;

// self
use crate::{
	_prelude::*,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

type EntryMap = RwLock<HashMap<CacheKey, Arc<TokenEntry>>>;
type GuardMap = Mutex<HashMap<CacheKey, Arc<AsyncMutex<()>>>>;

/// Process-owned token cache keyed by [`CacheKey`].
///
/// The cache is an ordinary value: construct it once, share it behind an `Arc`, and hand it to
/// every client that should reuse the same credentials. Independent caches never see each
/// other's entries.
pub struct TokenCache<I>
where
	I: TokenIssuer,
{
	issuer: I,
	ttl: Duration,
	entries: EntryMap,
	guards: GuardMap,
	metrics: CacheMetrics,
}
impl<I> TokenCache<I>
where
	I: TokenIssuer,
{
	/// Default lifetime of a cached token.
	pub const DEFAULT_TTL: Duration = Duration::minutes(30);

	/// Creates an empty cache that mints tokens through `issuer`.
	pub fn new(issuer: I) -> Self {
		Self {
			issuer,
			ttl: Self::DEFAULT_TTL,
			entries: Default::default(),
			guards: Default::default(),
			metrics: Default::default(),
		}
	}

	/// Overrides the token lifetime; non-positive values fall back to the default.
	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = if ttl.is_positive() { ttl } else { Self::DEFAULT_TTL };

		self
	}

	/// Lifetime applied to newly issued tokens.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Counters for hits, misses, and issuer calls.
	pub fn metrics(&self) -> &CacheMetrics {
		&self.metrics
	}

	/// Issuer backing this cache.
	pub fn issuer(&self) -> &I {
		&self.issuer
	}

	/// Returns a live token for `key`, issuing a new one on a miss or after expiry.
	pub async fn get_token(&self, key: &CacheKey) -> Result<AccessToken, I::Error> {
		self.get_token_at(key, OffsetDateTime::now_utc()).await
	}

	/// Same as [`get_token`](Self::get_token), evaluated against `now`.
	pub async fn get_token_at(
		&self,
		key: &CacheKey,
		now: OffsetDateTime,
	) -> Result<AccessToken, I::Error> {
		if let Some(token) = self.live_token(key, now) {
			self.metrics.record_hit();

			return Ok(token);
		}

		let guard = self.guard(key);
		let outcome = self.refill(key, now, &guard).await;

		self.release_guard(key, guard);

		outcome
	}

	/// Snapshot of the entry currently stored for `key`, live or expired.
	pub fn entry(&self, key: &CacheKey) -> Option<Arc<TokenEntry>> {
		self.entries.read().get(key).cloned()
	}

	/// Number of keys with a stored entry.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns `true` if no entry has been stored yet.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	fn live_token(&self, key: &CacheKey, now: OffsetDateTime) -> Option<AccessToken> {
		self.entries
			.read()
			.get(key)
			.filter(|entry| entry.is_usable_at(now))
			.map(|entry| entry.token.clone())
	}

	fn guard(&self, key: &CacheKey) -> Arc<AsyncMutex<()>> {
		let mut guards = self.guards.lock();

		guards.entry(key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}

	// Guards are cloned and released under the map lock, so a count of one means no caller is
	// waiting on this key.
	fn release_guard(&self, key: &CacheKey, guard: Arc<AsyncMutex<()>>) {
		let mut guards = self.guards.lock();

		drop(guard);

		if guards.get(key).is_some_and(|held| Arc::strong_count(held) == 1) {
			guards.remove(key);
		}
	}

	async fn refill(
		&self,
		key: &CacheKey,
		now: OffsetDateTime,
		guard: &AsyncMutex<()>,
	) -> Result<AccessToken, I::Error> {
		let _singleflight = guard.lock().await;

		if let Some(token) = self.live_token(key, now) {
			self.metrics.record_hit();

			return Ok(token);
		}

		self.metrics.record_miss();

		let entry = Arc::new(TokenEntry::new(self.issue(key).await?, now, self.ttl));
		let token = entry.token.clone();

		self.entries.write().insert(key.clone(), entry);

		Ok(token)
	}

	async fn issue(&self, key: &CacheKey) -> Result<AccessToken, I::Error> {
		const KIND: CallKind = CallKind::TokenIssue;

		let span = CallSpan::new(KIND, "issue");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		match span.instrument(self.issuer.issue(key)).await {
			Ok(token) => {
				self.metrics.record_issuance();
				obs::record_call_outcome(KIND, CallOutcome::Success);

				Ok(AccessToken::new(token))
			},
			Err(err) => {
				self.metrics.record_issuance_failure();
				obs::record_call_outcome(KIND, CallOutcome::Failure);

				Err(err)
			},
		}
	}
}
impl<I> Debug for TokenCache<I>
where
	I: TokenIssuer,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("ttl", &self.ttl)
			.field("entries", &self.len())
			.field("metrics", &self.metrics)
			.finish()
	}
}
