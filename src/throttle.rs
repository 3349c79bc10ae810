//! Per-provider throttle state tracking retry eligibility after failed exchanges.

// self
use crate::{_prelude::*, backoff};

/// Fixed suppression window applied after hard-block failures.
///
/// A 404 (malformed endpoint) or 403 (attestation rejected, bad credentials, project
/// removed) will not self-resolve by retrying sooner, so the window is a flat day
/// rather than an exponential schedule.
pub const HARD_BLOCK_WINDOW: Duration = Duration::days(1);

/// Snapshot of an active throttle window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleData {
	/// Consecutive failures observed since the record was last cleared.
	pub backoff_count: u32,
	/// Earliest instant a new exchange attempt is permitted.
	pub allow_requests_after: OffsetDateTime,
	/// Status code of the failure that produced this record.
	pub http_status: u16,
}
impl ThrottleData {
	/// Applies the failure transition for an HTTP-status-carrying exchange failure.
	///
	/// Hard-block statuses open a fixed [`HARD_BLOCK_WINDOW`] and reset the count to 1
	/// regardless of prior state; anything else escalates exponentially from the previous
	/// count (0 when clear) using the default backoff schedule.
	pub fn after_failure(prev: Option<&Self>, http_status: u16, now: OffsetDateTime) -> Self {
		if is_hard_block(http_status) {
			return Self {
				backoff_count: 1,
				allow_requests_after: now + HARD_BLOCK_WINDOW,
				http_status,
			};
		}

		let prev_count = prev.map_or(0, |data| data.backoff_count);

		Self {
			backoff_count: prev_count + 1,
			allow_requests_after: now + backoff::calculate_default_backoff(prev_count),
			http_status,
		}
	}

	/// Converts the record into the throttled error surfaced to callers.
	pub fn to_error(&self) -> Error {
		Error::Throttled { retry_at: self.allow_requests_after, http_status: self.http_status }
	}
}

/// Thread-safe slot owning one provider instance's throttle record.
///
/// The slot only guards the record itself; providers serialize the full
/// check-produce-exchange-record sequence with their own gate so concurrent callers
/// cannot both observe a clear slot and both issue exchange calls.
#[derive(Clone, Debug, Default)]
pub struct ThrottleSlot(Arc<Mutex<Option<ThrottleData>>>);
impl ThrottleSlot {
	/// Admission check against the current clock; see [`check_at`](Self::check_at).
	pub fn check(&self) -> Result<()> {
		self.check_at(OffsetDateTime::now_utc())
	}

	/// Admission check for a new exchange attempt.
	///
	/// An expired record is cleared, not merely ignored, before the attempt proceeds.
	/// While the window is still open the call fails with the record's throttled error
	/// and the record is left untouched, so repeated calls observe identical fields.
	pub fn check_at(&self, now: OffsetDateTime) -> Result<()> {
		let mut slot = self.0.lock();

		match slot.as_ref() {
			Some(data) if now >= data.allow_requests_after => {
				*slot = None;

				Ok(())
			},
			Some(data) => Err(data.to_error()),
			None => Ok(()),
		}
	}

	/// Records an HTTP-status-carrying exchange failure against the current clock.
	pub fn record_failure(&self, http_status: u16) -> ThrottleData {
		self.record_failure_at(http_status, OffsetDateTime::now_utc())
	}

	/// Clock-injectable variant of [`record_failure`](Self::record_failure).
	pub fn record_failure_at(&self, http_status: u16, now: OffsetDateTime) -> ThrottleData {
		let mut slot = self.0.lock();
		let next = ThrottleData::after_failure(slot.as_ref(), http_status, now);

		*slot = Some(next.clone());

		next
	}

	/// Returns a copy of the current record for diagnostics, if one exists.
	pub fn snapshot(&self) -> Option<ThrottleData> {
		self.0.lock().clone()
	}
}

/// Statuses warranting a fixed long suppression window rather than exponential backoff.
fn is_hard_block(status: u16) -> bool {
	matches!(status, 403 | 404)
}
