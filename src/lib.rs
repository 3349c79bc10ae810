//! Rust’s turnkey attestation token client—pluggable attestation providers, adaptive failure
//! throttling, and transport-aware observability in one crate built for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod app;
pub mod attest;
pub mod backoff;
pub mod error;
pub mod exchange;
pub mod identity;
pub mod obs;
pub mod provider;
pub mod throttle;
pub mod token;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		app::AppContext,
		attest::{Artifact, AttestationDriver, AttestationFuture},
		exchange::HttpExchanger,
		identity::{AppName, SiteKey},
		provider::ReCaptchaV3Provider,
	};

	/// Attestation driver that yields a fixed artifact, for exchange-focused tests.
	#[derive(Clone, Debug)]
	pub struct StaticDriver(pub String);
	impl AttestationDriver for StaticDriver {
		fn produce(&self, _app: &AppContext) -> AttestationFuture<'_> {
			let artifact = Artifact::new(self.0.clone());

			Box::pin(async move { Ok(artifact) })
		}
	}

	/// Builds an app context registered under the provided name.
	pub fn test_app(name: &str) -> Arc<AppContext> {
		Arc::new(AppContext::new(
			AppName::new(name).expect("Failed to build app name for tests."),
		))
	}

	/// Constructs a [`ReCaptchaV3Provider`] backed by a static driver and the reqwest exchanger
	/// pointed at a mock verification endpoint.
	pub fn build_http_test_provider(site_key: &str, endpoint: &str) -> ReCaptchaV3Provider {
		let site_key =
			SiteKey::new(site_key).expect("Failed to build site key for test provider.");
		let endpoint =
			Url::parse(endpoint).expect("Failed to parse mock verification endpoint URL.");
		let driver = Arc::new(StaticDriver("static-artifact".into()));

		ReCaptchaV3Provider::new(site_key, driver, Arc::new(HttpExchanger::new(endpoint)))
	}
}

mod _prelude {
	pub use std::{
		any::Any,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::{Arc, OnceLock, Weak},
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {httpmock as _, tokio as _};
