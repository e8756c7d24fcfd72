//! Request-building capability that keeps the executor generic over endpoint shapes.
//!
//! A [`RequestBuilder`] knows which remote operation it targets and how to encode its payload;
//! given the shared [`GatewayTransport`] it produces a [`GatewayCall`] bound to the typed
//! response the executor should decode.

pub mod payment;

pub use payment::*;

// self
use crate::{
	_prelude::*,
	transport::{GatewayCall, GatewayTransport},
};

/// Turns a typed request into a dispatchable call against a transport.
pub trait RequestBuilder
where
	Self: Send + Sync,
{
	/// Body type decoded from a successful response.
	type Response: DeserializeOwned + Send;

	/// Selects the remote operation and attaches the encoded payload.
	fn build_call(&self, transport: &GatewayTransport) -> Result<GatewayCall<Self::Response>>;
}
