//! Gateway-level error types shared by the cache, transport, and executor.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Failure below the HTTP protocol layer (DNS, TCP, proxy, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Payload could not be encoded or the response body could not be decoded.
	#[error(transparent)]
	Serialization(#[from] SerializationError),

	/// Gateway answered with a non-success status.
	#[error("Gateway rejected the request with HTTP {status}: {body}.")]
	Protocol {
		/// HTTP status code returned by the gateway.
		status: u16,
		/// Error body returned by the gateway, kept verbatim for diagnostics.
		body: String,
		/// Retry-After hint from the gateway, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token issuer failed to produce an access token.
	#[error("Token issuer failed to produce an access token.")]
	TokenIssuance {
		/// Failure reported by the issuer.
		#[source]
		source: BoxError,
	},
}
impl Error {
	/// Wraps an issuer failure inside [`Error::TokenIssuance`].
	pub fn token_issuance(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::TokenIssuance { source: Box::new(src) }
	}

	/// Returns the HTTP status for protocol failures.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Protocol { status, .. } => Some(*status),
			Self::Serialization(SerializationError::Decode { status, .. }) => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` if the failure happened below the HTTP protocol layer.
	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Transport(_))
	}

	/// Returns `true` if the gateway rejected the request with a non-success status.
	pub fn is_protocol(&self) -> bool {
		matches!(self, Self::Protocol { .. })
	}
}

/// Configuration and validation failures raised while building the transport.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Proxy endpoint was rejected by the HTTP client.
	#[error("Proxy `{proxy}` is invalid.")]
	InvalidProxy {
		/// Proxy URL that failed validation.
		proxy: String,
		/// Underlying failure.
		#[source]
		source: BoxError,
	},
	/// Request could not be assembled (e.g. a credential that is not a valid header value).
	#[error("Gateway request could not be built.")]
	InvalidRequest {
		/// Underlying builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint path cannot be joined onto the base URL.
	#[error("Endpoint `{path}` cannot be joined onto the base URL.")]
	InvalidEndpoint {
		/// Relative path that failed to join.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},

	/// Base URL must use `http` or `https`.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Proxy host was empty.
	#[error("Proxy host cannot be empty.")]
	EmptyProxyHost,
	/// Proxy port was zero.
	#[error("Proxy port cannot be zero.")]
	ZeroProxyPort,
	/// A timeout was zero or negative.
	#[error("The {timeout} timeout must be positive.")]
	NonPositiveTimeout {
		/// Which timeout failed validation.
		timeout: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, proxy, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Connect or read deadline elapsed.
	#[error("Request to the payment gateway timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Connection to the proxy or gateway could not be established.
	#[error("Could not connect to the payment gateway.")]
	Connect {
		/// Transport-specific connect error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the payment gateway.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Returns `true` if the failure was a connect or read deadline.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Timeout { .. })
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() {
			Self::Timeout { source: Box::new(e) }
		} else if e.is_connect() {
			Self::Connect { source: Box::new(e) }
		} else {
			Self::network(e)
		}
	}
}

/// Payload encoding and decoding failures.
#[derive(Debug, ThisError)]
pub enum SerializationError {
	/// Request payload could not be encoded as JSON.
	#[error("Request payload could not be encoded as JSON.")]
	Encode(#[source] serde_json::Error),
	/// Gateway responded with a success status but a body that does not match the response type.
	#[error("Gateway returned a malformed response body.")]
	Decode {
		/// Structured parsing failure, including the offending field path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
}
