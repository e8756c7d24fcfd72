//! Optional observability helpers for gateway calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `payment_gateway.call` with the `call`
//!   (operation) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `payment_gateway_call_total` counter for every
//!   attempt/success/failure, labeled by `call` + `outcome`, and the
//!   `payment_gateway_response_total` counter for every HTTP answer, labeled by `call` + `class`
//!   (`2xx`, `4xx`, ...). Token issuance never reaches the gateway, so only the first counter
//!   sees `token_issue`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// What a span or counter is measuring.
///
/// `TokenIssue` covers the cache's call into its issuer; the others are requests sent through the
/// proxy to the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Issuer call made on a cache miss or after expiry.
	TokenIssue,
	/// `POST payment` submission.
	Payment,
	/// Request from a caller-defined [`RequestBuilder`](crate::request::RequestBuilder).
	Custom,
}
impl CallKind {
	/// Returns `true` for calls that travel through the proxy to the gateway.
	pub const fn hits_gateway(self) -> bool {
		!matches!(self, CallKind::TokenIssue)
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::TokenIssue => "token_issue",
			CallKind::Payment => "payment",
			CallKind::Custom => "custom",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call; a gateway rejection counts as `Failure`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to an instrumented call.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Buckets an HTTP status into its `Nxx` class label.
pub const fn status_class(status: u16) -> &'static str {
	match status {
		100..=199 => "1xx",
		200..=299 => "2xx",
		300..=399 => "3xx",
		400..=499 => "4xx",
		500..=599 => "5xx",
		_ => "other",
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_classes_bucket_gateway_answers() {
		assert_eq!(status_class(200), "2xx");
		assert_eq!(status_class(204), "2xx");
		assert_eq!(status_class(402), "4xx");
		assert_eq!(status_class(503), "5xx");
		assert_eq!(status_class(42), "other");
	}

	#[test]
	fn only_token_issue_stays_local() {
		assert!(!CallKind::TokenIssue.hits_gateway());
		assert!(CallKind::Payment.hits_gateway());
		assert_eq!(CallKind::Custom.to_string(), "custom");
	}
}
