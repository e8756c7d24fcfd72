//! Proxied, pooled HTTP transport shared by every gateway call.
//!
//! [`GatewayTransport`] wraps one [`ReqwestClient`] configured from a [`TransportConfig`]:
//! every request goes through the configured HTTP proxy (system proxy settings are ignored),
//! connections are pooled and reused across calls, and both the connect and read phases are
//! bounded. Clones share the same pool. The transport holds no request state; request builders
//! use [`GatewayTransport::post`] to prepare a [`GatewayCall`], and the executor hands the built
//! request back to [`GatewayTransport::dispatch`].

pub mod call;
pub mod config;

pub use call::*;
pub use config::*;

// std
use std::ops::Deref;
// crates.io
use reqwest::{
	Proxy, Request, Response,
	header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER},
	redirect::Policy,
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, SerializationError},
	obs::CallKind,
};

/// Reusable dispatch handle bound to one proxy, pool, and timeout policy.
#[derive(Clone)]
pub struct GatewayTransport {
	config: Arc<TransportConfig>,
	client: ReqwestClient,
}
impl GatewayTransport {
	/// Builds the underlying client from `config`.
	pub fn new(config: TransportConfig) -> Result<Self> {
		let proxy_url = config.proxy.url();
		let proxy = Proxy::all(&proxy_url).map_err(|source| ConfigError::InvalidProxy {
			proxy: proxy_url.clone(),
			source: Box::new(source),
		})?;
		let client = ReqwestClient::builder()
			.no_proxy()
			.proxy(proxy)
			.connect_timeout(std_duration("connect", config.connect_timeout)?)
			.read_timeout(std_duration("read", config.read_timeout)?)
			.pool_idle_timeout(std_duration("pool idle", config.pool_idle_timeout)?)
			.pool_max_idle_per_host(config.pool_max_idle_per_host)
			.redirect(Policy::none())
			.user_agent(config.user_agent.as_str())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self { config: Arc::new(config), client })
	}

	/// Settings this transport was built from.
	pub fn config(&self) -> &TransportConfig {
		&self.config
	}

	/// Resolves `path` relative to the configured base URL.
	pub fn endpoint(&self, path: &str) -> Result<Url> {
		self.config.base_url.join(path.trim_start_matches('/')).map_err(|source| {
			ConfigError::InvalidEndpoint { path: path.to_owned(), source }.into()
		})
	}

	/// Prepares a JSON `POST` to `path`, bound to response type `T`.
	pub fn post<B, T>(&self, kind: CallKind, path: &str, body: &B) -> Result<GatewayCall<T>>
	where
		B: ?Sized + Serialize,
	{
		let url = self.endpoint(path)?;
		let payload = serde_json::to_vec(body).map_err(SerializationError::Encode)?;
		let builder = self
			.client
			.post(url)
			.header(CONTENT_TYPE, application_json())
			.header(ACCEPT, application_json())
			.body(payload);

		Ok(GatewayCall::new(kind, builder))
	}

	/// Sends a built request, re-establishing the connection when it could not be opened.
	///
	/// Only refused or reset connections are retried; those fail before any request byte reaches
	/// the proxy, so the gateway never sees the same request twice. A connect timeout is returned
	/// as is, so an unresponsive proxy costs at most one `connect_timeout`.
	pub async fn dispatch(&self, request: Request) -> Result<Response, ReqwestError> {
		let mut pending = request;
		let mut retries_left = self.config.connect_retries;

		loop {
			let spare = if retries_left > 0 { pending.try_clone() } else { None };

			match self.client.execute(pending).await {
				Err(err) if err.is_connect() && !err.is_timeout() => match spare {
					Some(next) => {
						retries_left -= 1;
						pending = next;
					},
					None => return Err(err),
				},
				outcome => return outcome,
			}
		}
	}
}
impl AsRef<ReqwestClient> for GatewayTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
impl Deref for GatewayTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.client
	}
}
impl Debug for GatewayTransport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GatewayTransport").field("config", &self.config).finish()
	}
}

/// Reads a `Retry-After` header expressed in seconds or as an RFC 2822 date.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(secs.into()));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

fn application_json() -> HeaderValue {
	HeaderValue::from_static("application/json")
}

fn std_duration(
	timeout: &'static str,
	value: Duration,
) -> Result<std::time::Duration, ConfigError> {
	std::time::Duration::try_from(value).map_err(|_| ConfigError::NonPositiveTimeout { timeout })
}
