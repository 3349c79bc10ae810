//! Client-level error types shared across providers, throttling, and exchange transports.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// `get_token` was called before the provider was bound to an app context.
	///
	/// Carries no app name; app identity is unknown at this call site.
	#[error("Provider has not been activated with an app context.")]
	UseBeforeActivation,
	/// Attestation production failed.
	///
	/// The underlying failure reason is intentionally discarded; the attestation
	/// collaborator's native failure signal carries no useful detail.
	#[error("Attestation artifact could not be produced.")]
	Attestation,
	/// Token requests are suppressed until the throttle window passes.
	#[error("Token requests are throttled until {retry_at} (HTTP status {http_status}).")]
	Throttled {
		/// Earliest instant a new exchange attempt is permitted.
		retry_at: OffsetDateTime,
		/// Status code of the exchange failure that opened the window.
		http_status: u16,
	},
	/// Exchange failure propagated verbatim; never opens a throttle window by itself.
	#[error(transparent)]
	Exchange(#[from] crate::exchange::ExchangeError),
}
