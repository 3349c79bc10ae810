// std
use std::{
	collections::VecDeque,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use time::{Duration, OffsetDateTime};
// self
use attest_broker::{
	app::AppContext,
	attest::{Artifact, AttestationDriver, AttestationFuture},
	error::Error,
	exchange::{ExchangeError, ExchangeFuture, TokenExchanger},
	identity::{AppName, SiteKey},
	provider::{AttestationProvider, CustomProvider, ReCaptchaV3Provider},
	token::Token,
};

#[derive(Clone, Copy)]
enum Step {
	Succeed,
	FailStatus(u16),
	FailNetwork,
}

#[derive(Default)]
struct CountingDriver {
	calls: AtomicUsize,
	fail: bool,
}
impl CountingDriver {
	fn failing() -> Self {
		Self { calls: AtomicUsize::new(0), fail: true }
	}

	fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl AttestationDriver for CountingDriver {
	fn produce(&self, _app: &AppContext) -> AttestationFuture<'_> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let fail = self.fail;

		Box::pin(async move {
			if fail {
				Err("recaptcha execution returned null".into())
			} else {
				Ok(Artifact::new("attested-claims"))
			}
		})
	}
}

#[derive(Default)]
struct ScriptedExchanger {
	calls: AtomicUsize,
	steps: Mutex<VecDeque<Step>>,
}
impl ScriptedExchanger {
	fn scripted(steps: impl IntoIterator<Item = Step>) -> Self {
		Self { calls: AtomicUsize::new(0), steps: Mutex::new(steps.into_iter().collect()) }
	}

	fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl TokenExchanger for ScriptedExchanger {
	fn exchange(&self, _app: &AppContext, _artifact: &Artifact) -> ExchangeFuture<'_> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let step = self
			.steps
			.lock()
			.expect("Exchanger script lock should never be poisoned.")
			.pop_front()
			.unwrap_or(Step::Succeed);

		Box::pin(async move {
			// A small pause keeps concurrent callers overlapping in the gate test.
			tokio::time::sleep(std::time::Duration::from_millis(25)).await;

			match step {
				Step::Succeed => Ok(Token::issued_now("issued-token")),
				Step::FailStatus(status) => Err(ExchangeError::status(status, b"denied")),
				Step::FailNetwork =>
					Err(ExchangeError::network(std::io::Error::other("socket closed"))),
			}
		})
	}
}

fn test_app(name: &str) -> Arc<AppContext> {
	Arc::new(AppContext::new(AppName::new(name).expect("App name should be valid for tests.")))
}

fn build_provider(
	site_key: &str,
	driver: Arc<CountingDriver>,
	exchanger: Arc<ScriptedExchanger>,
) -> ReCaptchaV3Provider {
	ReCaptchaV3Provider::new(
		SiteKey::new(site_key).expect("Site key should be valid for tests."),
		driver,
		exchanger,
	)
}

fn throttled_fields(err: Error) -> (OffsetDateTime, u16) {
	match err {
		Error::Throttled { retry_at, http_status } => (retry_at, http_status),
		other => panic!("Expected a throttled error, got {other:?}."),
	}
}

#[tokio::test]
async fn activation_is_required_before_any_work() {
	let driver = Arc::new(CountingDriver::default());
	let exchanger = Arc::new(ScriptedExchanger::default());
	let provider = build_provider("site-activation", driver.clone(), exchanger.clone());
	let err = provider.get_token().await.expect_err("Unactivated provider must fail.");

	assert!(matches!(err, Error::UseBeforeActivation));
	assert_eq!(driver.calls(), 0, "No attestation may be produced before activation.");
	assert_eq!(exchanger.calls(), 0);
}

#[tokio::test]
async fn successful_exchange_returns_the_token_unchanged() {
	let driver = Arc::new(CountingDriver::default());
	let exchanger = Arc::new(ScriptedExchanger::default());
	let provider = build_provider("site-success", driver.clone(), exchanger.clone());

	let app = test_app("app-success");

	provider.initialize(&app);

	let token = provider.get_token().await.expect("Exchange should succeed.");

	assert_eq!(token.secret().expose(), "issued-token");
	assert_eq!(driver.calls(), 1);
	assert_eq!(exchanger.calls(), 1);
	assert!(provider.throttle().is_none(), "Success must not create throttle state.");
}

#[tokio::test]
async fn driver_failures_collapse_to_the_generic_attestation_error() {
	let driver = Arc::new(CountingDriver::failing());
	let exchanger = Arc::new(ScriptedExchanger::default());
	let provider = build_provider("site-driver-fail", driver, exchanger.clone());

	let app = test_app("app-driver-fail");

	provider.initialize(&app);

	let err = provider.get_token().await.expect_err("Driver failure must surface.");

	assert!(matches!(err, Error::Attestation));
	assert_eq!(exchanger.calls(), 0, "A failed attestation must not reach the exchanger.");
}

#[tokio::test]
async fn hard_block_opens_a_one_day_window_and_suppresses_exchange() {
	let driver = Arc::new(CountingDriver::default());
	let exchanger = Arc::new(ScriptedExchanger::scripted([Step::FailStatus(403)]));
	let provider = build_provider("site-hard-block", driver.clone(), exchanger.clone());

	let app = test_app("app-hard-block");

	provider.initialize(&app);

	let before = OffsetDateTime::now_utc();
	let (retry_at, http_status) =
		throttled_fields(provider.get_token().await.expect_err("403 must throttle."));

	assert_eq!(http_status, 403);
	assert!(retry_at >= before + Duration::days(1));
	assert!(retry_at <= OffsetDateTime::now_utc() + Duration::days(1));
	assert_eq!(exchanger.calls(), 1);

	let data = provider.throttle().expect("A throttle record must exist after a 403.");

	assert_eq!(data.backoff_count, 1);

	// Inside the window: identical error, no further network traffic.
	let (retry_again, status_again) = throttled_fields(
		provider.get_token().await.expect_err("Window must suppress the next attempt."),
	);

	assert_eq!((retry_again, status_again), (retry_at, http_status));
	assert_eq!(driver.calls(), 1, "No attestation is produced while throttled.");
	assert_eq!(exchanger.calls(), 1, "No exchange call is made while throttled.");
}

#[tokio::test]
async fn transient_failure_escalates_then_clears_after_the_window() {
	let driver = Arc::new(CountingDriver::default());
	let exchanger = Arc::new(ScriptedExchanger::scripted([Step::FailStatus(500)]));
	let provider = build_provider("site-transient", driver.clone(), exchanger.clone());

	let app = test_app("app-transient");

	provider.initialize(&app);

	let before = OffsetDateTime::now_utc();
	let (retry_at, http_status) =
		throttled_fields(provider.get_token().await.expect_err("500 must throttle."));

	assert_eq!(http_status, 500);
	// First transient window: base 1 s with ±50% jitter.
	assert!(retry_at > before);
	assert!(retry_at <= OffsetDateTime::now_utc() + Duration::milliseconds(1_500));

	// Still inside the window.
	provider.get_token().await.expect_err("Window must suppress the next attempt.");
	assert_eq!(exchanger.calls(), 1);

	// Past the window: the record clears and exactly one new exchange happens.
	tokio::time::sleep(std::time::Duration::from_millis(1_600)).await;

	let token = provider.get_token().await.expect("Retry after the window should succeed.");

	assert_eq!(token.secret().expose(), "issued-token");
	assert_eq!(exchanger.calls(), 2);
	assert!(provider.throttle().is_none(), "The elapsed record must be cleared, not kept.");
}

#[tokio::test]
async fn non_status_failures_propagate_verbatim_without_throttling() {
	let driver = Arc::new(CountingDriver::default());
	let exchanger = Arc::new(ScriptedExchanger::scripted([Step::FailNetwork]));
	let provider = build_provider("site-network", driver.clone(), exchanger.clone());

	let app = test_app("app-network");

	provider.initialize(&app);

	let err = provider.get_token().await.expect_err("Network failure must surface.");

	assert!(matches!(err, Error::Exchange(ExchangeError::Network { .. })));
	assert!(provider.throttle().is_none(), "Transport failures carry no throttle verdict.");

	// The next attempt is admitted immediately.
	provider.get_token().await.expect("Next attempt should reach the exchanger.");
	assert_eq!(exchanger.calls(), 2);
}

#[tokio::test]
async fn concurrent_calls_share_one_failed_exchange_attempt() {
	let driver = Arc::new(CountingDriver::default());
	let exchanger = Arc::new(ScriptedExchanger::scripted([Step::FailStatus(500)]));
	let provider = Arc::new(build_provider("site-gate", driver.clone(), exchanger.clone()));

	let app = test_app("app-gate");

	provider.initialize(&app);

	let (first, second) = tokio::join!(provider.get_token(), provider.get_token());
	let first = throttled_fields(first.expect_err("First concurrent call must throttle."));
	let second = throttled_fields(second.expect_err("Second concurrent call must throttle."));

	assert_eq!(first, second, "Both callers must observe the same window.");
	assert_eq!(exchanger.calls(), 1, "Only one exchange may be issued by concurrent callers.");
}

#[test]
fn equality_is_identity_within_the_variant_and_false_across() {
	let driver = Arc::new(CountingDriver::default());
	let exchanger = Arc::new(ScriptedExchanger::default());
	let a = build_provider("site-equal", driver.clone(), exchanger.clone());
	let a_again = build_provider("site-equal", driver.clone(), exchanger.clone());
	let b = build_provider("site-other", driver, exchanger);
	let custom = CustomProvider::new(Arc::new(|| async { Ok("caller-token".to_owned()) }));

	assert!(a.is_equal(&a));
	assert!(a.is_equal(&a_again));
	assert!(a_again.is_equal(&a));
	assert!(!a.is_equal(&b));
	assert!(!a.is_equal(&custom), "Cross-variant comparisons are never equal.");
	assert!(!custom.is_equal(&a), "Cross-variant comparisons are never equal.");
}
