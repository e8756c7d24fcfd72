// std
use std::time::Instant;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use payment_gateway_client::{
	_preludet::*,
	cache::AccessToken,
	error::{Error, SerializationError, TransportError},
	executor::GatewayExecutor,
	request::PaymentStatus,
	transport::{GatewayTransport, TransportConfig},
};

fn executor_via(server: &MockServer) -> GatewayExecutor {
	let transport = GatewayTransport::new(proxied_config(&server.host(), server.port()))
		.expect("Transport should build.");

	GatewayExecutor::new(transport)
}

#[tokio::test]
async fn success_returns_decoded_body_through_proxy() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/payment")
				.header("authorization", "Bearer tok-abc")
				.header("content-type", "application/json")
				.json_body(json!({ "reference": "order-1", "amount": 1250, "currency": "EUR" }));
			then.status(200).header("content-type", "application/json").json_body(json!({
				"paymentId": "pay_1",
				"status": "approved",
				"reference": "order-1"
			}));
		})
		.await;
	let executor = executor_via(&server);
	let response = executor
		.process_payment(&payment("order-1", 1250), Some(&AccessToken::new("tok-abc")))
		.await
		.expect("Gateway call should succeed.");

	assert_eq!(response.payment_id, "pay_1");
	assert_eq!(response.status, PaymentStatus::Approved);
	assert_eq!(response.reference.as_deref(), Some("order-1"));

	mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_maps_to_protocol_error_with_body() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/payment");
			then.status(402).header("retry-after", "30").body("insufficient_funds");
		})
		.await;
	let err = executor_via(&server)
		.process_payment(&payment("order-402", 10_000), None)
		.await
		.expect_err("HTTP 402 should surface as an error.");

	assert!(err.to_string().contains("insufficient_funds"));

	match err {
		Error::Protocol { status, body, retry_after } => {
			assert_eq!(status, 402);
			assert_eq!(body, "insufficient_funds");
			assert_eq!(retry_after, Some(Duration::seconds(30)));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	mock.assert_async().await;
}

#[tokio::test]
async fn malformed_success_body_maps_to_serialization_error() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/payment");
			then.status(200).header("content-type", "application/json").body("{\"status\":\"approved\"}");
		})
		.await;
	let err = executor_via(&server)
		.process_payment(&payment("order-bad", 1), None)
		.await
		.expect_err("Missing payment id should fail to decode.");

	assert!(matches!(
		err,
		Error::Serialization(SerializationError::Decode { status: 200, .. })
	));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn unreachable_proxy_maps_to_transport_error() {
	let port = {
		let listener =
			std::net::TcpListener::bind("127.0.0.1:0").expect("Ephemeral port should bind.");

		listener.local_addr().expect("Listener should expose its address.").port()
	};
	let transport = GatewayTransport::new(proxied_config("127.0.0.1", port))
		.expect("Transport should build.");
	let started = Instant::now();
	let err = GatewayExecutor::new(transport)
		.process_payment(&payment("order-down", 5), None)
		.await
		.expect_err("Closed proxy port should fail.");

	assert!(matches!(err, Error::Transport(TransportError::Connect { .. })), "{err:?}");
	assert!(started.elapsed() < std::time::Duration::from_secs(2));
}

#[tokio::test]
async fn unresponsive_proxy_fails_within_one_connect_timeout() {
	let socket = tokio::net::TcpSocket::new_v4().expect("Socket should open.");

	socket
		.bind("127.0.0.1:0".parse().expect("Loopback address should parse."))
		.expect("Socket should bind.");

	let listener = socket.listen(0).expect("Listener should start.");
	let addr = listener.local_addr().expect("Listener should expose its address.");
	let mut queued = Vec::new();

	// Nobody accepts, so once the accept queue is full further handshakes stall.
	for _ in 0..16 {
		match std::net::TcpStream::connect_timeout(&addr, std::time::Duration::from_millis(100)) {
			Ok(stream) => queued.push(stream),
			Err(_) => break,
		}
	}

	let config = TransportConfig::builder(
		Url::parse(UNRESOLVABLE_GATEWAY).expect("Gateway fixture URL should parse."),
		"127.0.0.1",
		addr.port(),
	)
	.connect_timeout(Duration::milliseconds(500))
	.read_timeout(Duration::milliseconds(500))
	.build()
	.expect("Transport config should build.");

	assert_eq!(config.connect_retries, TransportConfig::DEFAULT_CONNECT_RETRIES);

	let started = Instant::now();
	let err = GatewayExecutor::new(GatewayTransport::new(config).expect("Transport should build."))
		.process_payment(&payment("order-stalled", 5), None)
		.await
		.expect_err("Stalled proxy should time out.");
	let elapsed = started.elapsed();

	match &err {
		Error::Transport(inner) => assert!(inner.is_timeout(), "{inner:?}"),
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert!(elapsed < std::time::Duration::from_millis(900), "took {elapsed:?}");

	drop(queued);
	drop(listener);
}

#[tokio::test]
async fn slow_gateway_hits_read_timeout() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/payment");
			then.status(200).delay(std::time::Duration::from_secs(3)).json_body(json!({
				"paymentId": "pay_late",
				"status": "approved"
			}));
		})
		.await;
	let config = TransportConfig::builder(
		Url::parse(UNRESOLVABLE_GATEWAY).expect("Gateway fixture URL should parse."),
		server.host(),
		server.port(),
	)
	.read_timeout(Duration::milliseconds(300))
	.build()
	.expect("Transport config should build.");
	let started = Instant::now();
	let err = GatewayExecutor::new(GatewayTransport::new(config).expect("Transport should build."))
		.process_payment(&payment("order-slow", 5), None)
		.await
		.expect_err("Delayed response should time out.");

	match &err {
		Error::Transport(inner) => assert!(inner.is_timeout(), "{inner:?}"),
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert!(started.elapsed() < std::time::Duration::from_secs(3));
}

#[tokio::test]
async fn concurrent_calls_keep_their_own_responses() {
	let server = MockServer::start_async().await;
	let first = server
		.mock_async(|when, then| {
			when.method(POST).path("/payment").json_body(json!({
				"reference": "order-a",
				"amount": 100,
				"currency": "EUR"
			}));
			then.status(200)
				.delay(std::time::Duration::from_millis(100))
				.json_body(json!({ "paymentId": "pay_a", "status": "approved" }));
		})
		.await;
	let second = server
		.mock_async(|when, then| {
			when.method(POST).path("/payment").json_body(json!({
				"reference": "order-b",
				"amount": 200,
				"currency": "EUR"
			}));
			then.status(200).json_body(json!({ "paymentId": "pay_b", "status": "declined" }));
		})
		.await;
	let executor = executor_via(&server);
	let payment_a = payment("order-a", 100);
	let payment_b = payment("order-b", 200);
	let (a, b) = tokio::join!(
		executor.process_payment(&payment_a, None),
		executor.process_payment(&payment_b, None),
	);
	let a = a.expect("First concurrent call should succeed.");
	let b = b.expect("Second concurrent call should succeed.");

	assert_eq!((a.payment_id.as_str(), a.status), ("pay_a", PaymentStatus::Approved));
	assert_eq!((b.payment_id.as_str(), b.status), ("pay_b", PaymentStatus::Declined));

	first.assert_async().await;
	second.assert_async().await;
}
