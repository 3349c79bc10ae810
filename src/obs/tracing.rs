// self
use crate::{_prelude::*, obs::ProviderKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedAcquire<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedAcquire<F> = F;

/// A span builder used around token acquisition.
#[derive(Clone, Debug)]
pub struct TokenSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl TokenSpan {
	/// Creates a new span tagged with the provider variant + stage.
	pub fn new(kind: ProviderKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("attest_broker.get_token", provider = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> TokenSpanGuard {
		#[cfg(feature = "tracing")]
		{
			TokenSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			TokenSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedAcquire<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`TokenSpan::entered`].
pub struct TokenSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for TokenSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenSpanGuard(..)")
	}
}

/// Emits a debug event attributing a produced artifact to its app (when tracing is
/// enabled). Only the fingerprint is logged, never the artifact itself.
pub fn trace_artifact(app: &str, fingerprint: &str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(app, artifact = fingerprint, "Attestation artifact produced.");
	#[cfg(not(feature = "tracing"))]
	let _ = (app, fingerprint);
}

/// Emits a debug event attributing an issued token to its app (when tracing is enabled).
pub fn trace_issuance(app: &str, kind: ProviderKind) {
	#[cfg(feature = "tracing")]
	tracing::debug!(app, provider = kind.as_str(), "Token issued.");
	#[cfg(not(feature = "tracing"))]
	let _ = (app, kind);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_span_noop_without_tracing() {
		let _guard = TokenSpan::new(ProviderKind::Custom, "test").entered();

		trace_artifact("app", "fingerprint");
		trace_issuance("app", ProviderKind::Custom);
	}

	#[cfg(feature = "tracing")]
	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = TokenSpan::new(ProviderKind::ReCaptchaV3, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
