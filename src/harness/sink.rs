//! Destinations for attempt outcomes.

use crate::harness::outcome::{AttemptResult, RequestOutcome};
use crate::observability::metrics;

/// Receives every attempt as soon as it finishes.
///
/// Called concurrently from all requesters.
pub trait OutcomeSink: Send + Sync + 'static {
    fn record(&self, outcome: &RequestOutcome);

    /// Called once a requester has issued its whole sequence.
    fn requester_finished(&self, _requester: usize) {}
}

/// Logs each attempt and feeds the client metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl OutcomeSink for TracingSink {
    fn record(&self, outcome: &RequestOutcome) {
        metrics::record_client_attempt(outcome.result.label(), outcome.elapsed);

        let start = humantime::format_rfc3339_millis(outcome.start);
        let stop = humantime::format_rfc3339_millis(outcome.stop);
        match &outcome.result {
            AttemptResult::Success => tracing::debug!(
                requester = outcome.requester,
                sequence = outcome.sequence,
                %start,
                %stop,
                elapsed = ?outcome.elapsed,
                "Request succeeded"
            ),
            AttemptResult::Failure(reason) => tracing::warn!(
                requester = outcome.requester,
                sequence = outcome.sequence,
                %start,
                %stop,
                elapsed = ?outcome.elapsed,
                error = %reason,
                "Request failed"
            ),
            other => tracing::info!(
                requester = outcome.requester,
                sequence = outcome.sequence,
                %start,
                %stop,
                elapsed = ?outcome.elapsed,
                status = ?outcome.status,
                outcome = %other,
                "Request refused by server"
            ),
        }
    }

    fn requester_finished(&self, requester: usize) {
        tracing::info!(requester, "All requests executed");
    }
}
