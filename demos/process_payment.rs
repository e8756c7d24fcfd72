//! Demonstrates submitting payments through a proxy with a shared token cache, using a local
//! mock server that stands in for both the proxy and the gateway behind it.

// std
use std::{
	convert::Infallible,
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use payment_gateway_client::{
	cache::{CacheKey, FnTokenIssuer, TokenCache},
	client::PaymentGatewayClient,
	request::{PaymentRequest, PaymentRequestBuilder},
	transport::TransportConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let payment_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/payment").header("authorization", "Bearer demo-token-1");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"paymentId": "pay_demo",
				"status": "approved",
				"reference": "invoice-42"
			}));
		})
		.await;
	let minted = AtomicU64::new(0);
	let issuer = FnTokenIssuer::new(move |key: &CacheKey| {
		let n = minted.fetch_add(1, Ordering::SeqCst) + 1;

		println!("Minting token #{n} for {key}.");

		Ok::<_, Infallible>(format!("demo-token-{n}"))
	});
	let cache = Arc::new(TokenCache::new(issuer));
	let config =
		TransportConfig::builder(Url::parse("http://gateway.invalid/v1")?, server.host(), server.port())
			.build()?;
	let client = PaymentGatewayClient::new(config, cache.clone(), CacheKey::new("merchant-demo")?)?;

	for attempt in 1..=2 {
		let request = PaymentRequestBuilder::new(
			PaymentRequest::new("invoice-42", 4_200, "EUR")
				.with_description("Demo order")
				.with_metadata("attempt", attempt.to_string()),
		);
		let response = client.process_payment(&request).await?;

		println!("Payment {} is {:?}.", response.payment_id, response.status);
	}

	println!("Issuer was called {} time(s).", cache.metrics().issuances());

	payment_mock.assert_calls_async(2).await;

	Ok(())
}
