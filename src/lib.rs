//! Proxied payment gateway client: cache short-lived access tokens with single-flight
//! regeneration, dispatch typed calls through a pooled, timeout-bounded transport, and surface
//! every failure through one error taxonomy.

#![deny(clippy::all, missing_docs)]
#![cfg_attr(not(test), deny(unused_crate_dependencies))]

pub mod cache;
pub mod client;
pub mod error;
pub mod executor;
pub mod obs;
pub mod request;
pub mod transport;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{
		convert::Infallible,
		sync::atomic::{AtomicU64, Ordering},
	};
	// self
	use crate::{
		cache::{CacheKey, IssueFuture, TokenCache, TokenIssuer},
		client::PaymentGatewayClient,
		request::{PaymentRequest, PaymentRequestBuilder},
		transport::TransportConfig,
	};

	/// Host that never resolves; reaching it proves traffic went through the proxy.
	pub const UNRESOLVABLE_GATEWAY: &str = "http://gateway.invalid/";

	/// Issuer that hands out `token-1`, `token-2`, ... in call order.
	#[derive(Debug, Default)]
	pub struct CountingIssuer {
		issued: AtomicU64,
	}
	impl CountingIssuer {
		/// Number of tokens issued so far.
		pub fn issued(&self) -> u64 {
			self.issued.load(Ordering::SeqCst)
		}
	}
	impl TokenIssuer for CountingIssuer {
		type Error = Infallible;

		fn issue<'a>(&'a self, _key: &'a CacheKey) -> IssueFuture<'a, Self::Error> {
			let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

			Box::pin(async move { Ok(format!("token-{n}")) })
		}
	}

	/// Builds an issuer that returns a new sequential token on every call.
	pub fn counting_issuer() -> CountingIssuer {
		CountingIssuer::default()
	}

	/// Parses a cache key fixture.
	pub fn cache_key(value: &str) -> CacheKey {
		CacheKey::new(value).expect("Cache key fixture should be valid.")
	}

	/// Builds a transport config that targets the unresolvable gateway through the given proxy.
	pub fn proxied_config(proxy_host: &str, proxy_port: u16) -> TransportConfig {
		TransportConfig::builder(
			Url::parse(UNRESOLVABLE_GATEWAY).expect("Gateway fixture URL should parse."),
			proxy_host,
			proxy_port,
		)
		.connect_timeout(Duration::seconds(2))
		.read_timeout(Duration::seconds(2))
		.build()
		.expect("Transport config fixture should build.")
	}

	/// Builds a client whose proxy is the provided `host:port` and whose cache hands out
	/// sequential tokens.
	pub fn build_test_client(
		proxy_host: &str,
		proxy_port: u16,
		merchant: &str,
	) -> (PaymentGatewayClient<CountingIssuer>, Arc<TokenCache<CountingIssuer>>) {
		let cache = Arc::new(TokenCache::new(counting_issuer()));
		let client = PaymentGatewayClient::new(
			proxied_config(proxy_host, proxy_port),
			cache.clone(),
			cache_key(merchant),
		)
		.expect("Payment gateway client fixture should build.");

		(client, cache)
	}

	/// Builds a payment request fixture with the given reference and amount.
	pub fn payment(reference: &str, amount: u64) -> PaymentRequestBuilder {
		PaymentRequestBuilder::new(PaymentRequest::new(reference, amount, "EUR"))
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::Hash,
		marker::PhantomData,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, StatusCode};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
