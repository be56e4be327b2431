use crate::constants::{DEFAULT_COMPLETION_TIMEOUT, DEFAULT_POLL_INTERVAL};
use crate::error::Error;
use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

/// The two submission strategies under comparison.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// The gateway forwards the order and blocks until the backend has
    /// processed it.
    Sync,
    /// The gateway queues the order and returns as soon as it is accepted.
    Async,
}

impl Endpoint {
    /// Path segment of the submission route on the gateway.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Sync => "submitordersync",
            Endpoint::Async => "submitorderasync",
        }
    }

    /// Short label used in reports and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::Sync => "sync",
            Endpoint::Async => "async",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One benchmark configuration: which endpoint to drive, how many concurrent
/// submissions per trial, and how many trials to average over.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TrialConfig {
    pub endpoint: Endpoint,
    pub requests: u32,
    pub repeats: u32,
}

impl TrialConfig {
    pub fn new(endpoint: Endpoint, requests: u32, repeats: u32) -> Self {
        Self {
            endpoint,
            requests,
            repeats,
        }
    }

    /// Rejects degenerate configurations before any trial machinery runs.
    pub fn validate(&self) -> Result<(), Error> {
        if self.requests == 0 {
            return Err(Error::InvalidConfig("requests must be at least 1".into()));
        }
        if self.repeats == 0 {
            return Err(Error::InvalidConfig("repeats must be at least 1".into()));
        }
        Ok(())
    }
}

/// Tunables shared by every trial a [`Harness`](crate::Harness) runs.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Pause between order-count queries while waiting for completion.
    pub poll_interval: Duration,
    /// How long the poller waits for the backend to catch up before failing
    /// the trial. `None` waits forever, which never terminates if the
    /// backend loses an order.
    pub completion_timeout: Option<Duration>,
    /// Cap on submission attempts per order. `None` retries until success.
    pub max_attempts: Option<NonZeroU32>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            completion_timeout: Some(DEFAULT_COMPLETION_TIMEOUT),
            max_attempts: None,
        }
    }
}
