//! Pluggable attestation providers and the capability contract they share.
//!
//! The variant set is closed: a reCAPTCHA v3 provider that exchanges attestation
//! artifacts under throttle control, and a custom provider that defers token issuance
//! to a caller-supplied source. Both satisfy [`AttestationProvider`], the contract the
//! registry dispatching `get_token` calls consumes.

pub mod custom;
pub mod recaptcha;

pub use custom::*;
pub use recaptcha::*;

// self
use crate::{_prelude::*, app::AppContext, token::Token};

/// Boxed future returned by [`AttestationProvider::get_token`].
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<Token>> + 'a + Send>>;

/// Capability set shared by every provider variant.
pub trait AttestationProvider
where
	Self: Send + Sync,
{
	/// Obtains a fresh token, consulting provider-specific throttle state.
	///
	/// Every path either returns a token or raises one classified [`Error`]; nothing is
	/// retried internally.
	fn get_token(&self) -> TokenFuture<'_>;

	/// Binds the provider to its owning app context.
	///
	/// Must be called exactly once before the first `get_token`; the first bind wins and
	/// later binds are ignored.
	fn initialize(&self, app: &Arc<AppContext>);

	/// Compares provider identity; always false across variants or against unrelated
	/// implementations.
	fn is_equal(&self, other: &dyn AttestationProvider) -> bool;

	/// Upcast hook used by [`is_equal`](Self::is_equal) implementations to see across
	/// the trait-object boundary.
	fn as_any(&self) -> &dyn Any;
}
