//! Per-attempt results recorded by the load harness.

use std::fmt;
use std::time::{Duration, SystemTime};

use reqwest::StatusCode;

/// Classification of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    Success,
    /// Transport failure or an unexpected response.
    Failure(String),
    /// The server's rate gate refused the request.
    Rejected,
    /// The server's deadline expired before the delay completed.
    TimedOut,
}

impl AttemptResult {
    /// Classify a response the server actually produced.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            s if s.is_success() => AttemptResult::Success,
            StatusCode::TOO_MANY_REQUESTS => AttemptResult::Rejected,
            StatusCode::GATEWAY_TIMEOUT => AttemptResult::TimedOut,
            s => AttemptResult::Failure(format!("unexpected status {s}")),
        }
    }

    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            AttemptResult::Success => "success",
            AttemptResult::Failure(_) => "failure",
            AttemptResult::Rejected => "rejected",
            AttemptResult::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for AttemptResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptResult::Failure(reason) => write!(f, "failure: {reason}"),
            other => f.write_str(other.label()),
        }
    }
}

/// One finished attempt. Immutable once built.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub requester: usize,
    pub sequence: usize,
    pub start: SystemTime,
    pub stop: SystemTime,
    pub elapsed: Duration,
    /// HTTP status, absent on transport failures.
    pub status: Option<u16>,
    pub result: AttemptResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(AttemptResult::from_status(StatusCode::OK), AttemptResult::Success);
        assert_eq!(
            AttemptResult::from_status(StatusCode::TOO_MANY_REQUESTS),
            AttemptResult::Rejected
        );
        assert_eq!(
            AttemptResult::from_status(StatusCode::GATEWAY_TIMEOUT),
            AttemptResult::TimedOut
        );
        assert!(matches!(
            AttemptResult::from_status(StatusCode::BAD_GATEWAY),
            AttemptResult::Failure(reason) if reason.contains("502")
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(AttemptResult::TimedOut.to_string(), "timed_out");
        assert_eq!(
            AttemptResult::Failure("connection refused".into()).to_string(),
            "failure: connection refused"
        );
    }
}
