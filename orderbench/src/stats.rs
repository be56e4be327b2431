use crate::config::Endpoint;
use std::time::Duration;

/// What one submission task reports back to its trial.
#[derive(Debug, Copy, Clone)]
pub struct SubmitOutcome {
    pub order: u64,
    /// False only when an attempt cap was configured and exhausted.
    pub succeeded: bool,
    /// Rejected attempts preceding the final one.
    pub failures: u64,
    /// Wall-clock span from the first attempt to the final response, so time
    /// burned on retries counts toward it.
    pub latency: Duration,
}

/// Measurements from a single trial.
#[derive(Debug, Copy, Clone)]
pub struct TrialResult {
    pub endpoint: Endpoint,
    pub requests: u32,
    /// Time for the whole wave to receive its final responses.
    pub sent_elapsed: Duration,
    /// Time until the backend counter confirmed every order, measured from
    /// the same starting instant as `sent_elapsed`.
    pub processed_elapsed: Duration,
    /// Rejected attempts summed across the wave.
    pub failures: u64,
    /// Mean per-order submission latency.
    pub mean_latency: Duration,
}

/// Averages over repeated trials of one configuration.
#[derive(Debug, Copy, Clone)]
pub struct TrialSummary {
    pub endpoint: Endpoint,
    pub requests: u32,
    pub mean_latency: Duration,
    /// Orders per minute, derived from the averaged processing time rather
    /// than averaged from per-trial rates.
    pub throughput_per_min: f64,
    pub mean_failures: f64,
    pub mean_sent_elapsed: Duration,
    pub mean_processed_elapsed: Duration,
}

impl TrialSummary {
    /// Collapse repeated trials of a single configuration into one averaged
    /// summary.
    ///
    /// All results must come from the same `(endpoint, requests)` pair.
    /// Panics on an empty slice.
    pub fn from_trials(trials: &[TrialResult]) -> Self {
        assert!(!trials.is_empty(), "no trials to summarize");
        let endpoint = trials[0].endpoint;
        let requests = trials[0].requests;
        debug_assert!(trials
            .iter()
            .all(|t| t.endpoint == endpoint && t.requests == requests));

        let n = trials.len() as u32;
        let mean_latency = trials.iter().map(|t| t.mean_latency).sum::<Duration>() / n;
        let mean_sent_elapsed = trials.iter().map(|t| t.sent_elapsed).sum::<Duration>() / n;
        let mean_processed_elapsed =
            trials.iter().map(|t| t.processed_elapsed).sum::<Duration>() / n;
        let mean_failures = trials.iter().map(|t| t.failures).sum::<u64>() as f64 / f64::from(n);

        Self {
            endpoint,
            requests,
            mean_latency,
            throughput_per_min: throughput_per_min(requests, mean_processed_elapsed),
            mean_failures,
            mean_sent_elapsed,
            mean_processed_elapsed,
        }
    }
}

/// Completed orders per minute of wall-clock processing time.
fn throughput_per_min(requests: u32, processed: Duration) -> f64 {
    f64::from(requests) / (processed.as_secs_f64() / 60.)
}
