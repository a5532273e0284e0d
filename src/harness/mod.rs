//! Concurrent load harness.
//!
//! # Data Flow
//! ```text
//! LoadHarness::run
//!     → spawn N requester tasks
//!     → each issues M sequential GET {base_url}/ping, pausing between them
//!     → every attempt becomes a RequestOutcome
//!     → OutcomeSink::record as soon as it finishes
//!     → join all requesters → RunReport
//! ```
//!
//! # Design Decisions
//! - A failed attempt never aborts its requester or the run
//! - The run resolves only after every requester has finished
//! - Latency percentiles are computed over successful attempts

pub mod client;
pub mod outcome;
pub mod sink;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use futures_util::future::join_all;
use tokio::time::Instant;

use crate::config::HarnessConfig;

pub use client::build_client;
pub use outcome::{AttemptResult, RequestOutcome};
pub use sink::{OutcomeSink, TracingSink};

/// Drives `requesters × requests_per_requester` pings against one server.
pub struct LoadHarness {
    client: reqwest::Client,
    config: HarnessConfig,
    sink: Arc<dyn OutcomeSink>,
}

impl LoadHarness {
    /// Build a harness with a client made from `config.client`.
    pub fn new(config: HarnessConfig, sink: Arc<dyn OutcomeSink>) -> reqwest::Result<Self> {
        let client = build_client(&config.client)?;
        Ok(Self::with_client(client, config, sink))
    }

    pub fn with_client(
        client: reqwest::Client,
        config: HarnessConfig,
        sink: Arc<dyn OutcomeSink>,
    ) -> Self {
        Self {
            client,
            config,
            sink,
        }
    }

    pub fn ping_url(&self) -> String {
        format!("{}/ping", self.config.base_url.trim_end_matches('/'))
    }

    /// Run every requester to completion and summarize the outcomes.
    pub async fn run(&self) -> RunReport {
        let url = Arc::<str>::from(self.ping_url());
        let pause = Duration::from_millis(self.config.pause_ms);
        let requests = self.config.requests_per_requester;

        tracing::info!(
            url = %url,
            requesters = self.config.requesters,
            requests_per_requester = requests,
            pause_ms = self.config.pause_ms,
            "Starting load run"
        );

        let started = Instant::now();
        let tasks = (0..self.config.requesters).map(|requester| {
            let requester_loop = Requester {
                id: requester,
                client: self.client.clone(),
                url: url.clone(),
                sink: self.sink.clone(),
                requests,
                pause,
            };
            tokio::spawn(requester_loop.run())
        });

        let mut outcomes = Vec::with_capacity(self.config.requesters * requests);
        for joined in join_all(tasks).await {
            match joined {
                Ok(batch) => outcomes.extend(batch),
                Err(e) => tracing::error!(error = %e, "Requester task failed"),
            }
        }

        let report = RunReport::new(outcomes, started.elapsed());
        tracing::info!(
            total = report.total(),
            succeeded = report.succeeded,
            failed = report.failed,
            rejected = report.rejected,
            timed_out = report.timed_out,
            duration = ?report.duration,
            "Load run finished"
        );
        report
    }
}

/// One requester's sequential loop.
struct Requester {
    id: usize,
    client: reqwest::Client,
    url: Arc<str>,
    sink: Arc<dyn OutcomeSink>,
    requests: usize,
    pause: Duration,
}

impl Requester {
    async fn run(self) -> Vec<RequestOutcome> {
        let mut outcomes = Vec::with_capacity(self.requests);
        for sequence in 0..self.requests {
            if sequence > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            let outcome = self.attempt(sequence).await;
            self.sink.record(&outcome);
            outcomes.push(outcome);
        }
        self.sink.requester_finished(self.id);
        outcomes
    }

    async fn attempt(&self, sequence: usize) -> RequestOutcome {
        let start = SystemTime::now();
        let began = Instant::now();

        let (status, result) = match self.client.get(&*self.url).send().await {
            Ok(response) => {
                let status = response.status();
                // Drain the body so the connection goes back to the pool.
                let result = match response.bytes().await {
                    Ok(_) => AttemptResult::from_status(status),
                    Err(e) => AttemptResult::Failure(e.to_string()),
                };
                (Some(status.as_u16()), result)
            }
            Err(e) => (None, AttemptResult::Failure(e.to_string())),
        };

        RequestOutcome {
            requester: self.id,
            sequence,
            start,
            stop: SystemTime::now(),
            elapsed: began.elapsed(),
            status,
            result,
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub succeeded: usize,
    pub failed: usize,
    pub rejected: usize,
    pub timed_out: usize,
    pub duration: Duration,
    pub p50: Option<Duration>,
    pub p95: Option<Duration>,
    pub p99: Option<Duration>,
    pub outcomes: Vec<RequestOutcome>,
}

impl RunReport {
    pub fn new(outcomes: Vec<RequestOutcome>, duration: Duration) -> Self {
        let mut succeeded = 0;
        let mut failed = 0;
        let mut rejected = 0;
        let mut timed_out = 0;
        let mut latencies = Vec::new();

        for outcome in &outcomes {
            match outcome.result {
                AttemptResult::Success => {
                    succeeded += 1;
                    latencies.push(outcome.elapsed);
                }
                AttemptResult::Failure(_) => failed += 1,
                AttemptResult::Rejected => rejected += 1,
                AttemptResult::TimedOut => timed_out += 1,
            }
        }
        latencies.sort();

        Self {
            succeeded,
            failed,
            rejected,
            timed_out,
            duration,
            p50: percentile(&latencies, 0.50),
            p95: percentile(&latencies, 0.95),
            p99: percentile(&latencies, 0.99),
            outcomes,
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn requests_per_sec(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.total() as f64 / secs
        } else {
            0.0
        }
    }
}

fn percentile(sorted: &[Duration], quantile: f64) -> Option<Duration> {
    if sorted.is_empty() {
        return None;
    }
    let index = ((sorted.len() as f64 * quantile) as usize).min(sorted.len() - 1);
    Some(sorted[index])
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |d: Option<Duration>| d.map_or_else(|| "-".to_string(), |d| format!("{d:?}"));

        writeln!(f, "--- Load Run Results ---")?;
        writeln!(f, "Total Requests: {}", self.total())?;
        writeln!(f, "Succeeded:      {}", self.succeeded)?;
        writeln!(f, "Failed:         {}", self.failed)?;
        writeln!(f, "Rejected (429): {}", self.rejected)?;
        writeln!(f, "Timed out (504):{}", self.timed_out)?;
        writeln!(f, "Total Duration: {:?}", self.duration)?;
        writeln!(f, "Requests/sec:   {:.2}", self.requests_per_sec())?;
        writeln!(f, "P50 Latency:    {}", show(self.p50))?;
        writeln!(f, "P95 Latency:    {}", show(self.p95))?;
        writeln!(f, "P99 Latency:    {}", show(self.p99))?;
        write!(f, "------------------------")
    }
}
