//! reCAPTCHA v3 provider that exchanges attestation artifacts under throttle control.

// self
use crate::{
	_prelude::*,
	app::{AppContext, AppHandle},
	attest::AttestationDriver,
	exchange::TokenExchanger,
	identity::SiteKey,
	obs::{self, ProviderKind, TokenOutcome, TokenSpan},
	provider::{AttestationProvider, TokenFuture},
	throttle::{ThrottleData, ThrottleSlot},
};
#[cfg(feature = "reqwest")] use crate::exchange::HttpExchanger;

/// Attestation provider backed by reCAPTCHA v3.
///
/// Identity is the immutable site key; the throttle record and the app back-reference
/// are instance-exclusive state. The async gate serializes the whole
/// check-produce-exchange-record sequence so two concurrent callers can never both
/// observe a clear throttle and both issue exchange calls.
pub struct ReCaptchaV3Provider {
	site_key: SiteKey,
	app: AppHandle,
	throttle: ThrottleSlot,
	gate: AsyncMutex<()>,
	driver: Arc<dyn AttestationDriver>,
	exchanger: Arc<dyn TokenExchanger>,
}
impl ReCaptchaV3Provider {
	/// Creates a provider for the given site key and collaborator pair.
	pub fn new(
		site_key: SiteKey,
		driver: Arc<dyn AttestationDriver>,
		exchanger: Arc<dyn TokenExchanger>,
	) -> Self {
		Self {
			site_key,
			app: AppHandle::new(),
			throttle: ThrottleSlot::default(),
			gate: AsyncMutex::new(()),
			driver,
			exchanger,
		}
	}

	/// Creates a provider that exchanges artifacts against the provided verification
	/// endpoint using the crate's default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn with_endpoint(
		site_key: SiteKey,
		driver: Arc<dyn AttestationDriver>,
		endpoint: Url,
	) -> Self {
		Self::new(site_key, driver, Arc::new(HttpExchanger::new(endpoint)))
	}

	/// Returns the immutable site key identifying this provider.
	pub fn site_key(&self) -> &SiteKey {
		&self.site_key
	}

	/// Returns the active throttle record for diagnostics, if any.
	pub fn throttle(&self) -> Option<ThrottleData> {
		self.throttle.snapshot()
	}
}
impl AttestationProvider for ReCaptchaV3Provider {
	fn get_token(&self) -> TokenFuture<'_> {
		Box::pin(async move {
			const KIND: ProviderKind = ProviderKind::ReCaptchaV3;

			let span = TokenSpan::new(KIND, "get_token");

			obs::record_token_outcome(KIND, TokenOutcome::Attempt);

			let result = span
				.instrument(async move {
					let app = self.app.upgrade()?;
					let _gate = self.gate.lock().await;

					self.throttle.check()?;

					// The driver's native failure signal carries no useful detail;
					// collapse it to the single generic attestation error.
					let artifact =
						self.driver.produce(&app).await.map_err(|_| Error::Attestation)?;

					obs::trace_artifact(app.name().as_ref(), &artifact.fingerprint());

					match self.exchanger.exchange(&app, &artifact).await {
						Ok(token) => Ok(token),
						Err(err) => match err.throttle_status() {
							Some(status) =>
								Err(self.throttle.record_failure(status).to_error()),
							None => Err(err.into()),
						},
					}
				})
				.await;

			match &result {
				Ok(_) => obs::record_token_outcome(KIND, TokenOutcome::Success),
				Err(Error::Throttled { .. }) =>
					obs::record_token_outcome(KIND, TokenOutcome::Throttled),
				Err(_) => obs::record_token_outcome(KIND, TokenOutcome::Failure),
			}

			result
		})
	}

	fn initialize(&self, app: &Arc<AppContext>) {
		self.app.bind(app);
	}

	fn is_equal(&self, other: &dyn AttestationProvider) -> bool {
		other.as_any().downcast_ref::<Self>().is_some_and(|other| other.site_key == self.site_key)
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}
impl Debug for ReCaptchaV3Provider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReCaptchaV3Provider")
			.field("site_key", &self.site_key)
			.field("activated", &self.app.is_bound())
			.field("throttle", &self.throttle.snapshot())
			.finish()
	}
}
