//! Composing client: cached credentials plus the gateway executor.

// self
use crate::{
	_prelude::*,
	cache::{CacheKey, TokenCache, TokenIssuer},
	executor::GatewayExecutor,
	request::{PaymentRequestBuilder, PaymentResponse, RequestBuilder},
	transport::{GatewayTransport, TransportConfig},
};

/// Payment gateway client bound to one credential scope.
///
/// The client owns its transport but borrows the [`TokenCache`] through an `Arc`, so several
/// clients (e.g. one per merchant) can share a cache while tests build isolated ones. Every call
/// first asks the cache for a live token under the client's [`CacheKey`], then runs a single
/// attempt through the [`GatewayExecutor`].
pub struct PaymentGatewayClient<I>
where
	I: TokenIssuer,
{
	executor: GatewayExecutor,
	cache: Arc<TokenCache<I>>,
	key: CacheKey,
}
impl<I> PaymentGatewayClient<I>
where
	I: TokenIssuer,
{
	/// Builds the proxied transport from `config` and binds the client to `key`.
	pub fn new(config: TransportConfig, cache: Arc<TokenCache<I>>, key: CacheKey) -> Result<Self> {
		Ok(Self::with_transport(GatewayTransport::new(config)?, cache, key))
	}

	/// Reuses an existing transport (and its connection pool).
	pub fn with_transport(transport: GatewayTransport, cache: Arc<TokenCache<I>>, key: CacheKey) -> Self {
		Self { executor: GatewayExecutor::new(transport), cache, key }
	}

	/// Submits a payment with a cached bearer token.
	pub async fn process_payment(&self, request: &PaymentRequestBuilder) -> Result<PaymentResponse> {
		self.execute(request).await
	}

	/// Runs any request builder with a cached bearer token.
	pub async fn execute<R>(&self, request: &R) -> Result<R::Response>
	where
		R: ?Sized + RequestBuilder,
	{
		let token = self.cache.get_token(&self.key).await.map_err(Error::token_issuance)?;

		self.executor.execute(request, Some(&token)).await
	}

	/// Transport shared by this client's calls.
	pub fn transport(&self) -> &GatewayTransport {
		self.executor.transport()
	}

	/// Token cache backing this client.
	pub fn cache(&self) -> &Arc<TokenCache<I>> {
		&self.cache
	}

	/// Credential scope used for every call.
	pub fn key(&self) -> &CacheKey {
		&self.key
	}
}
impl<I> Clone for PaymentGatewayClient<I>
where
	I: TokenIssuer,
{
	fn clone(&self) -> Self {
		Self { executor: self.executor.clone(), cache: self.cache.clone(), key: self.key.clone() }
	}
}
impl<I> Debug for PaymentGatewayClient<I>
where
	I: TokenIssuer,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PaymentGatewayClient")
			.field("key", &self.key)
			.field("transport", self.executor.transport())
			.finish()
	}
}
