//! Pure exponential backoff calculator with bounded jitter.

// crates.io
use rand::Rng;
// self
use crate::_prelude::*;

/// Base interval applied before the first retry window.
pub const DEFAULT_BASE: Duration = Duration::seconds(1);
/// Growth factor applied per consecutive failure.
pub const DEFAULT_FACTOR: f64 = 2.;
/// Upper bound applied to every computed delay.
pub const MAX_DELAY: Duration = Duration::hours(4);

const RANDOM_FACTOR: f64 = 0.5;

/// Computes the jittered delay before the next exchange attempt.
///
/// The delay grows as `base * factor^attempt_count`, randomized by up to ±50% so many
/// clients recovering from the same outage do not retry in lockstep, and capped at
/// [`MAX_DELAY`]. Pure up to the jitter; no side effects, no I/O.
pub fn calculate_backoff(attempt_count: u32, base: Duration, factor: f64) -> Duration {
	let cap = MAX_DELAY.whole_milliseconds() as f64;
	let base_millis = (base.whole_milliseconds() as f64).max(0.);
	let exponent = i32::try_from(attempt_count).unwrap_or(i32::MAX);
	let raw = (base_millis * factor.powi(exponent)).min(cap);
	let jitter = rand::rng().random_range(-1.0..1.0) * RANDOM_FACTOR * raw;
	let delay = (raw + jitter).clamp(0., cap);

	Duration::milliseconds(delay.round() as i64)
}

/// Computes the jittered delay using the crate defaults (1 s base, factor 2).
pub fn calculate_default_backoff(attempt_count: u32) -> Duration {
	calculate_backoff(attempt_count, DEFAULT_BASE, DEFAULT_FACTOR)
}
