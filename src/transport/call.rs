//! Prepared gateway calls bound to a typed response.

// crates.io
use reqwest::{Request, RequestBuilder as ReqwestRequestBuilder};
// self
use crate::{_prelude::*, cache::AccessToken, error::ConfigError, obs::CallKind};

/// Prepared, not yet sent gateway request bound to response type `T`.
pub struct GatewayCall<T> {
	kind: CallKind,
	builder: ReqwestRequestBuilder,
	_response: PhantomData<fn() -> T>,
}
impl<T> GatewayCall<T> {
	/// Wraps a reqwest builder produced by a [`GatewayTransport`](crate::transport::GatewayTransport).
	pub fn new(kind: CallKind, builder: ReqwestRequestBuilder) -> Self {
		Self { kind, builder, _response: PhantomData }
	}

	/// Operation label used for spans and metrics.
	pub fn kind(&self) -> CallKind {
		self.kind
	}

	/// Attaches `token` as an `Authorization: Bearer` credential.
	pub fn bearer_auth(mut self, token: &AccessToken) -> Self {
		self.builder = self.builder.bearer_auth(token.expose());

		self
	}

	/// Applies an arbitrary change to the underlying reqwest builder (extra headers, query, ...).
	pub fn map_request<F>(mut self, f: F) -> Self
	where
		F: FnOnce(ReqwestRequestBuilder) -> ReqwestRequestBuilder,
	{
		self.builder = f(self.builder);

		self
	}

	/// Finalizes the request.
	pub fn into_request(self) -> Result<Request> {
		self.builder
			.build()
			.map_err(|source| ConfigError::InvalidRequest { source: Box::new(source) }.into())
	}
}
impl<T> Debug for GatewayCall<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GatewayCall").field("kind", &self.kind).finish()
	}
}
