//! Optional observability helpers for token acquisition.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `attest_broker.get_token` with the
//!   `provider` (variant) and `stage` (call site) fields, plus debug events carrying app
//!   attribution and artifact fingerprints (never raw secrets).
//! - Enable `metrics` to increment the `attest_broker_token_total` counter for every
//!   attempt/success/throttled/failure, labeled by `provider` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Provider variants observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
	/// reCAPTCHA v3 attestation provider.
	ReCaptchaV3,
	/// Caller-supplied custom provider.
	Custom,
}
impl ProviderKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderKind::ReCaptchaV3 => "recaptcha_v3",
			ProviderKind::Custom => "custom",
		}
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each token acquisition attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenOutcome {
	/// Entry to a provider's `get_token`.
	Attempt,
	/// Successful completion.
	Success,
	/// Attempt suppressed or rejected by the throttle state machine.
	Throttled,
	/// Any other failure propagated back to the caller.
	Failure,
}
impl TokenOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenOutcome::Attempt => "attempt",
			TokenOutcome::Success => "success",
			TokenOutcome::Throttled => "throttled",
			TokenOutcome::Failure => "failure",
		}
	}
}
impl Display for TokenOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
