//! Payment submission payloads and their request builder.

// self
use crate::{
	_prelude::*,
	obs::CallKind,
	request::RequestBuilder,
	transport::{GatewayCall, GatewayTransport},
};

/// Path of the payment endpoint, relative to the gateway base URL.
pub const PAYMENT_PATH: &str = "payment";

/// Payment submitted to the gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
	/// Caller-side reference echoed back by the gateway.
	pub reference: String,
	/// Amount in minor currency units.
	pub amount: u64,
	/// ISO 4217 currency code.
	pub currency: String,
	/// Free-form description shown to the payer.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Extra key/value pairs forwarded as-is.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub metadata: BTreeMap<String, String>,
}
impl PaymentRequest {
	/// Creates a request without description or metadata.
	pub fn new(reference: impl Into<String>, amount: u64, currency: impl Into<String>) -> Self {
		Self {
			reference: reference.into(),
			amount,
			currency: currency.into(),
			description: None,
			metadata: BTreeMap::new(),
		}
	}

	/// Sets the payer-facing description.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());

		self
	}

	/// Adds one metadata entry.
	pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.metadata.insert(key.into(), value.into());

		self
	}
}

/// Processing state reported by the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
	/// Funds were captured.
	Approved,
	/// Gateway accepted the payment for asynchronous processing.
	Pending,
	/// Payment was refused.
	Declined,
	/// Status this client does not recognize.
	#[serde(other)]
	Unknown,
}

/// Gateway answer to a payment submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
	/// Gateway-assigned payment identifier.
	pub payment_id: String,
	/// Processing state.
	pub status: PaymentStatus,
	/// Caller reference, when echoed.
	#[serde(default)]
	pub reference: Option<String>,
	/// Human-readable detail.
	#[serde(default)]
	pub message: Option<String>,
}

/// Builds `POST /payment` calls for a [`PaymentRequest`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentRequestBuilder {
	request: PaymentRequest,
}
impl PaymentRequestBuilder {
	/// Wraps the payment to submit.
	pub fn new(request: PaymentRequest) -> Self {
		Self { request }
	}

	/// Payment carried by this builder.
	pub fn request(&self) -> &PaymentRequest {
		&self.request
	}
}
impl From<PaymentRequest> for PaymentRequestBuilder {
	fn from(request: PaymentRequest) -> Self {
		Self::new(request)
	}
}
impl RequestBuilder for PaymentRequestBuilder {
	type Response = PaymentResponse;

	fn build_call(&self, transport: &GatewayTransport) -> Result<GatewayCall<Self::Response>> {
		transport.post(CallKind::Payment, PAYMENT_PATH, &self.request)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::transport::TransportConfig;

	#[test]
	fn request_uses_camel_case_and_skips_empty_fields() {
		let plain = serde_json::to_value(PaymentRequest::new("order-1", 1250, "EUR"))
			.expect("Payment request should serialize.");

		assert_eq!(
			plain,
			serde_json::json!({ "reference": "order-1", "amount": 1250, "currency": "EUR" })
		);

		let detailed = serde_json::to_value(
			PaymentRequest::new("order-2", 99, "USD")
				.with_description("Coffee")
				.with_metadata("table", "7"),
		)
		.expect("Detailed payment request should serialize.");

		assert_eq!(detailed["description"], "Coffee");
		assert_eq!(detailed["metadata"]["table"], "7");
	}

	#[test]
	fn unknown_statuses_are_tolerated() {
		let response: PaymentResponse =
			serde_json::from_str("{\"paymentId\":\"pay_1\",\"status\":\"chargeback\"}")
				.expect("Unknown statuses should deserialize.");

		assert_eq!(response.status, PaymentStatus::Unknown);
		assert_eq!(response.reference, None);
	}

	#[test]
	fn builder_targets_the_payment_endpoint() {
		let config = TransportConfig::builder(
			Url::parse("https://gateway.example.com/v1").expect("Failed to parse base URL."),
			"proxy.local",
			3128,
		)
		.build()
		.expect("Transport config should build.");
		let transport = GatewayTransport::new(config).expect("Transport should build.");
		let call = PaymentRequestBuilder::from(PaymentRequest::new("order-3", 500, "GBP"))
			.build_call(&transport)
			.expect("Payment call should build.");

		assert_eq!(call.kind(), CallKind::Payment);

		let request = call.into_request().expect("Payment request should finalize.");

		assert_eq!(request.url().as_str(), "https://gateway.example.com/v1/payment");
	}
}
