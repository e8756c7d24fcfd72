//! Transport settings: proxy endpoint, timeouts, pooling, and their validating builder.

// self
use crate::{_prelude::*, error::ConfigError};

/// HTTP proxy every outbound request is routed through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
	/// Proxy host name or IP address.
	pub host: String,
	/// Proxy TCP port.
	pub port: u16,
}
impl ProxyEndpoint {
	/// Renders the proxy as an `http://host:port` URL, bracketing bare IPv6 literals.
	pub fn url(&self) -> String {
		if self.host.contains(':') && !self.host.starts_with('[') {
			format!("http://[{}]:{}", self.host, self.port)
		} else {
			format!("http://{}:{}", self.host, self.port)
		}
	}
}

/// Immutable transport settings shared by every call made through one
/// [`GatewayTransport`](crate::transport::GatewayTransport).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportConfig {
	/// Gateway root; always ends with `/` so relative endpoints join beneath it.
	pub base_url: Url,
	/// Mandatory outbound proxy.
	pub proxy: ProxyEndpoint,
	/// Deadline for establishing a connection (to the proxy).
	pub connect_timeout: Duration,
	/// Deadline for each read on an established connection.
	pub read_timeout: Duration,
	/// How long idle pooled connections are kept.
	pub pool_idle_timeout: Duration,
	/// Upper bound on idle pooled connections per host.
	pub pool_max_idle_per_host: usize,
	/// Reconnection attempts when a connection cannot be established.
	pub connect_retries: u8,
	/// `User-Agent` header sent with every request.
	pub user_agent: String,
}
impl TransportConfig {
	/// Default connect deadline.
	pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::seconds(30);
	/// Default read deadline.
	pub const DEFAULT_READ_TIMEOUT: Duration = Duration::seconds(30);
	/// Default idle lifetime for pooled connections.
	pub const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::seconds(90);
	/// Default reconnection attempts.
	pub const DEFAULT_CONNECT_RETRIES: u8 = 1;

	/// Creates a builder for the mandatory `(base_url, proxy_host, proxy_port)` triple.
	pub fn builder(
		base_url: Url,
		proxy_host: impl Into<String>,
		proxy_port: u16,
	) -> TransportConfigBuilder {
		TransportConfigBuilder::new(base_url, proxy_host, proxy_port)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if !matches!(self.base_url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { url: self.base_url.to_string() });
		}
		if self.proxy.host.trim().is_empty() {
			return Err(ConfigError::EmptyProxyHost);
		}
		if self.proxy.port == 0 {
			return Err(ConfigError::ZeroProxyPort);
		}

		validate_timeout("connect", self.connect_timeout)?;
		validate_timeout("read", self.read_timeout)?;
		validate_timeout("pool idle", self.pool_idle_timeout)?;

		Ok(())
	}
}

/// Builder for [`TransportConfig`] values.
#[derive(Debug)]
pub struct TransportConfigBuilder {
	base_url: Url,
	proxy: ProxyEndpoint,
	connect_timeout: Duration,
	read_timeout: Duration,
	pool_idle_timeout: Duration,
	pool_max_idle_per_host: usize,
	connect_retries: u8,
	user_agent: String,
}
impl TransportConfigBuilder {
	fn new(base_url: Url, proxy_host: impl Into<String>, proxy_port: u16) -> Self {
		Self {
			base_url,
			proxy: ProxyEndpoint { host: proxy_host.into(), port: proxy_port },
			connect_timeout: TransportConfig::DEFAULT_CONNECT_TIMEOUT,
			read_timeout: TransportConfig::DEFAULT_READ_TIMEOUT,
			pool_idle_timeout: TransportConfig::DEFAULT_POOL_IDLE_TIMEOUT,
			pool_max_idle_per_host: usize::MAX,
			connect_retries: TransportConfig::DEFAULT_CONNECT_RETRIES,
			user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into(),
		}
	}

	/// Overrides the connect deadline (defaults to 30 seconds).
	pub fn connect_timeout(mut self, timeout: Duration) -> Self {
		self.connect_timeout = timeout;

		self
	}

	/// Overrides the read deadline (defaults to 30 seconds).
	pub fn read_timeout(mut self, timeout: Duration) -> Self {
		self.read_timeout = timeout;

		self
	}

	/// Overrides the idle lifetime of pooled connections (defaults to 90 seconds).
	pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
		self.pool_idle_timeout = timeout;

		self
	}

	/// Caps idle pooled connections per host (unbounded by default).
	pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
		self.pool_max_idle_per_host = max;

		self
	}

	/// Overrides how many times a failed connection is re-established (defaults to 1).
	pub fn connect_retries(mut self, retries: u8) -> Self {
		self.connect_retries = retries;

		self
	}

	/// Overrides the `User-Agent` header.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<TransportConfig, ConfigError> {
		let mut base_url = self.base_url;

		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		let config = TransportConfig {
			base_url,
			proxy: self.proxy,
			connect_timeout: self.connect_timeout,
			read_timeout: self.read_timeout,
			pool_idle_timeout: self.pool_idle_timeout,
			pool_max_idle_per_host: self.pool_max_idle_per_host,
			connect_retries: self.connect_retries,
			user_agent: self.user_agent,
		};

		config.validate()?;

		Ok(config)
	}
}

fn validate_timeout(timeout: &'static str, value: Duration) -> Result<(), ConfigError> {
	if value.is_positive() { Ok(()) } else { Err(ConfigError::NonPositiveTimeout { timeout }) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse gateway URL fixture.")
	}

	#[test]
	fn defaults_match_gateway_policy() {
		let config = TransportConfig::builder(url("https://gateway.example.com"), "proxy.local", 3128)
			.build()
			.expect("Default config should build.");

		assert_eq!(config.connect_timeout, Duration::seconds(30));
		assert_eq!(config.read_timeout, Duration::seconds(30));
		assert_eq!(config.connect_retries, 1);
		assert_eq!(config.base_url.as_str(), "https://gateway.example.com/");
		assert_eq!(config.proxy.url(), "http://proxy.local:3128");
	}

	#[test]
	fn base_path_gains_trailing_slash() {
		let config = TransportConfig::builder(url("https://gateway.example.com/api/v2"), "proxy", 8080)
			.build()
			.expect("Config with a base path should build.");

		assert_eq!(config.base_url.as_str(), "https://gateway.example.com/api/v2/");
	}

	#[test]
	fn rejects_invalid_settings() {
		let base = url("https://gateway.example.com");

		assert!(matches!(
			TransportConfig::builder(base.clone(), " ", 8080).build(),
			Err(ConfigError::EmptyProxyHost)
		));
		assert!(matches!(
			TransportConfig::builder(base.clone(), "proxy", 0).build(),
			Err(ConfigError::ZeroProxyPort)
		));
		assert!(matches!(
			TransportConfig::builder(base.clone(), "proxy", 8080)
				.read_timeout(Duration::ZERO)
				.build(),
			Err(ConfigError::NonPositiveTimeout { timeout: "read" })
		));
		assert!(matches!(
			TransportConfig::builder(base, "proxy", 8080)
				.connect_timeout(Duration::seconds(-1))
				.build(),
			Err(ConfigError::NonPositiveTimeout { timeout: "connect" })
		));
		assert!(matches!(
			TransportConfig::builder(url("ftp://gateway.example.com"), "proxy", 8080).build(),
			Err(ConfigError::UnsupportedScheme { .. })
		));
	}

	#[test]
	fn ipv6_proxy_hosts_are_bracketed() {
		let proxy = ProxyEndpoint { host: "::1".into(), port: 3128 };

		assert_eq!(proxy.url(), "http://[::1]:3128");
	}
}
