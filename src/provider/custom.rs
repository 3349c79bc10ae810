//! Custom provider backed by a caller-supplied token source.
//!
//! Custom sources have caller-defined failure semantics, so this provider applies no
//! throttle logic: source failures propagate to the caller unchanged, and successful
//! results only pass through the issuance-timestamp normalizer.

// self
use crate::{
	_prelude::*,
	app::{AppContext, AppHandle},
	obs::{self, ProviderKind, TokenOutcome, TokenSpan},
	provider::{AttestationProvider, TokenFuture},
	token::Token,
};

/// Boxed future returned by [`CustomTokenSource::fetch`].
pub type CustomTokenFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + 'a + Send>>;

/// Caller-supplied source that issues raw signed tokens on demand.
///
/// Implemented automatically for async closures; failures are never retried or wrapped
/// by the provider.
pub trait CustomTokenSource
where
	Self: Send + Sync,
{
	/// Produces a raw token string.
	fn fetch(&self) -> CustomTokenFuture<'_>;
}
impl<F, Fut> CustomTokenSource for F
where
	F: Send + Sync + Fn() -> Fut,
	Fut: 'static + Send + Future<Output = Result<String>>,
{
	fn fetch(&self) -> CustomTokenFuture<'_> {
		Box::pin(self())
	}
}

/// Attestation provider that defers issuance to a caller-supplied source.
pub struct CustomProvider {
	source: Arc<dyn CustomTokenSource>,
	app: AppHandle,
}
impl CustomProvider {
	/// Creates a provider around the supplied source.
	pub fn new(source: Arc<dyn CustomTokenSource>) -> Self {
		Self { source, app: AppHandle::new() }
	}
}
impl AttestationProvider for CustomProvider {
	fn get_token(&self) -> TokenFuture<'_> {
		Box::pin(async move {
			const KIND: ProviderKind = ProviderKind::Custom;

			let span = TokenSpan::new(KIND, "get_token");

			obs::record_token_outcome(KIND, TokenOutcome::Attempt);

			let result = span
				.instrument(async move {
					let app = self.app.upgrade()?;
					let raw = self.source.fetch().await?;

					obs::trace_issuance(app.name().as_ref(), KIND);

					Ok(Token::normalized(raw))
				})
				.await;

			match &result {
				Ok(_) => obs::record_token_outcome(KIND, TokenOutcome::Success),
				Err(_) => obs::record_token_outcome(KIND, TokenOutcome::Failure),
			}

			result
		})
	}

	fn initialize(&self, app: &Arc<AppContext>) {
		self.app.bind(app);
	}

	/// Equality is the source's persistent identity (`Arc::ptr_eq`), not behavioral
	/// equivalence: two sources built from identical code still compare unequal. Closures
	/// cannot be compared by value in general, so this is a known limitation.
	fn is_equal(&self, other: &dyn AttestationProvider) -> bool {
		other
			.as_any()
			.downcast_ref::<Self>()
			.is_some_and(|other| Arc::ptr_eq(&self.source, &other.source))
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}
impl Debug for CustomProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CustomProvider")
			.field("source", &"<caller-supplied>")
			.field("activated", &self.app.is_bound())
			.finish()
	}
}
