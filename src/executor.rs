//! Single-attempt execution of gateway calls.
//!
//! [`GatewayExecutor::execute`] runs one linear request/response cycle: build the call from a
//! [`RequestBuilder`], attach the bearer token, dispatch through the shared transport, and map
//! the outcome. A 2xx body is decoded into the builder's response type; any other status becomes
//! [`Error::Protocol`] carrying the body text; failures below HTTP become [`Error::Transport`].
//! Nothing is retried at this level.

// self
use crate::{
	_prelude::*,
	cache::AccessToken,
	error::{SerializationError, TransportError},
	obs::{self, CallOutcome, CallSpan},
	request::{PaymentRequestBuilder, PaymentResponse, RequestBuilder},
	transport::{self, GatewayCall, GatewayTransport},
};

/// Executes calls against one shared [`GatewayTransport`].
#[derive(Clone, Debug)]
pub struct GatewayExecutor {
	transport: GatewayTransport,
}
impl GatewayExecutor {
	/// Creates an executor dispatching through `transport`.
	pub fn new(transport: GatewayTransport) -> Self {
		Self { transport }
	}

	/// Transport shared by every call.
	pub fn transport(&self) -> &GatewayTransport {
		&self.transport
	}

	/// Submits a payment.
	pub async fn process_payment(
		&self,
		request: &PaymentRequestBuilder,
		token: Option<&AccessToken>,
	) -> Result<PaymentResponse> {
		self.execute(request, token).await
	}

	/// Builds, authenticates, and runs the call described by `request`.
	pub async fn execute<R>(&self, request: &R, token: Option<&AccessToken>) -> Result<R::Response>
	where
		R: ?Sized + RequestBuilder,
	{
		let mut call = request.build_call(&self.transport)?;

		if let Some(token) = token {
			call = call.bearer_auth(token);
		}

		let kind = call.kind();
		let span = CallSpan::new(kind, "execute");

		obs::record_call_outcome(kind, CallOutcome::Attempt);

		let result = span.instrument(self.run(call, &span)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(kind, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(kind, CallOutcome::Failure),
		}

		result
	}

	async fn run<T>(&self, call: GatewayCall<T>, span: &CallSpan) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let call_kind = call.kind();
		let response =
			self.transport.dispatch(call.into_request()?).await.map_err(TransportError::from)?;
		let status = response.status();

		span.record_status(status.as_u16());
		obs::record_gateway_response(call_kind, status.as_u16());

		let retry_after = transport::parse_retry_after(response.headers());
		let body = response.bytes().await.map_err(TransportError::from)?;

		if !status.is_success() {
			return Err(Error::Protocol {
				status: status.as_u16(),
				body: String::from_utf8_lossy(&body).into_owned(),
				retry_after,
			});
		}

		decode(status, &body)
	}
}

fn decode<T>(status: StatusCode, body: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	// An empty success body decodes like JSON `null`, so `()` and `Option<_>` responses work.
	let raw = if body.is_empty() { b"null".as_slice() } else { body };
	let mut deserializer = serde_json::Deserializer::from_slice(raw);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| SerializationError::Decode { source, status: status.as_u16() }.into())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::request::PaymentStatus;

	#[test]
	fn decodes_success_bodies() {
		let response: PaymentResponse = decode(
			StatusCode::OK,
			b"{\"paymentId\":\"pay_1\",\"status\":\"approved\",\"reference\":\"order-1\"}",
		)
		.expect("Valid body should decode.");

		assert_eq!(response.payment_id, "pay_1");
		assert_eq!(response.status, PaymentStatus::Approved);
	}

	#[test]
	fn empty_bodies_decode_as_null() {
		decode::<()>(StatusCode::NO_CONTENT, b"").expect("Unit responses accept empty bodies.");

		assert_eq!(
			decode::<Option<PaymentResponse>>(StatusCode::ACCEPTED, b"")
				.expect("Optional responses accept empty bodies."),
			None
		);
	}

	#[test]
	fn malformed_bodies_surface_field_path() {
		let err = decode::<PaymentResponse>(StatusCode::OK, b"{\"paymentId\":42,\"status\":\"approved\"}")
			.expect_err("Numeric payment id should be rejected.");

		match err {
			Error::Serialization(SerializationError::Decode { source, status }) => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "paymentId");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
