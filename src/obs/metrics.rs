// self
use crate::obs::{ProviderKind, TokenOutcome};

/// Records a token acquisition outcome via the global metrics recorder (when enabled).
pub fn record_token_outcome(kind: ProviderKind, outcome: TokenOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"attest_broker_token_total",
			"provider" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}
