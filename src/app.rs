//! Application context handles shared between providers and the registry that owns the app.

// self
use crate::{_prelude::*, identity::AppName};

/// Externally-owned application context.
///
/// Providers never own the app's lifetime; they hold a [`Weak`] back-reference through an
/// [`AppHandle`] and use the context only for attestation production and log attribution.
#[derive(Debug)]
pub struct AppContext {
	name: AppName,
}
impl AppContext {
	/// Creates a new context for the provided app name.
	pub fn new(name: AppName) -> Self {
		Self { name }
	}

	/// Returns the stable app identifier used for attribution.
	pub fn name(&self) -> &AppName {
		&self.name
	}
}

/// Set-once, non-owning handle to the app context backing a provider.
///
/// The first [`bind`](AppHandle::bind) wins; later binds are ignored, matching the
/// activate-exactly-once provider lifecycle. Upgrading fails when the handle was never
/// bound or the owning registry has already dropped the app.
#[derive(Debug, Default)]
pub struct AppHandle(OnceLock<Weak<AppContext>>);
impl AppHandle {
	/// Creates an unbound handle.
	pub fn new() -> Self {
		Self::default()
	}

	/// Binds the handle to the provided app context. First bind wins.
	pub fn bind(&self, app: &Arc<AppContext>) {
		let _ = self.0.set(Arc::downgrade(app));
	}

	/// Returns `true` once the handle has been bound.
	pub fn is_bound(&self) -> bool {
		self.0.get().is_some()
	}

	/// Upgrades to the owning context, failing with [`Error::UseBeforeActivation`] when the
	/// handle is unbound or the app has been dropped.
	pub fn upgrade(&self) -> Result<Arc<AppContext>> {
		self.0.get().and_then(Weak::upgrade).ok_or(Error::UseBeforeActivation)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn app(name: &str) -> Arc<AppContext> {
		Arc::new(AppContext::new(AppName::new(name).expect("App name fixture should be valid.")))
	}

	#[test]
	fn unbound_handle_fails_activation() {
		let handle = AppHandle::new();

		assert!(!handle.is_bound());
		assert!(matches!(handle.upgrade(), Err(Error::UseBeforeActivation)));
	}

	#[test]
	fn first_bind_wins() {
		let first = app("first");
		let second = app("second");
		let handle = AppHandle::new();

		handle.bind(&first);
		handle.bind(&second);

		let upgraded = handle.upgrade().expect("Bound handle should upgrade.");

		assert_eq!(upgraded.name().as_ref(), "first");
	}

	#[test]
	fn dropped_app_fails_activation() {
		let handle = AppHandle::new();

		{
			let app = app("ephemeral");

			handle.bind(&app);
		}

		assert!(handle.is_bound());
		assert!(matches!(handle.upgrade(), Err(Error::UseBeforeActivation)));
	}
}
