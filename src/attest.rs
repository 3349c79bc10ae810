//! Attestation production contracts and artifact handling.
//!
//! The crate never loads or executes an attestation mechanism itself; callers supply an
//! [`AttestationDriver`] (a reCAPTCHA execution harness, a platform attestor, a test stub)
//! and providers translate any driver failure into the single generic attestation error.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, app::AppContext};

/// Opaque failure raised by attestation drivers.
///
/// No structured detail is required; providers discard it by design.
pub type DriverError = Box<dyn StdError + Send + Sync>;

/// Boxed future returned by [`AttestationDriver::produce`].
pub type AttestationFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Artifact, DriverError>> + 'a + Send>>;

/// Produces attestation artifacts on behalf of a bound app context.
///
/// Implementations clone whatever they need from `app` before entering their async
/// block; the future may borrow the driver but not the context.
pub trait AttestationDriver
where
	Self: Send + Sync,
{
	/// Produces a fresh artifact for the provided app.
	fn produce(&self, app: &AppContext) -> AttestationFuture<'_>;
}

/// Opaque proof of authenticity produced by a driver and submitted for exchange.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact(String);
impl Artifact {
	/// Wraps a raw artifact string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw artifact for exchange payloads. Callers must avoid logging this
	/// string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns a base64 (no padding) SHA-256 digest of the artifact, safe for logs and
	/// spans.
	pub fn fingerprint(&self) -> String {
		let mut hasher = Sha256::new();

		hasher.update(self.0.as_bytes());

		let digest = hasher.finalize();

		STANDARD_NO_PAD.encode(digest)
	}
}
impl Debug for Artifact {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Artifact").field(&self.fingerprint()).finish()
	}
}
