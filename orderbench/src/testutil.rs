//! Deterministic in-memory stand-in for the order stack, driven by the
//! paused tokio clock.

use crate::backend::Backend;
use crate::config::Endpoint;
use crate::error::BackendError;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Counter-backed fake [`Backend`].
///
/// Processing an order means sleeping for `lag`, then bumping the counter.
/// By default that happens inline, like the sync endpoint. With `defer` set
/// it happens on a spawned task, so `submit` returns before the counter
/// moves, like the async endpoint. Rejections are scripted per order id.
pub(crate) struct FakeBackend {
    counter: Arc<AtomicU64>,
    submits: AtomicU64,
    count_reads: AtomicU64,
    fail_plan: Mutex<HashMap<u64, u64>>,
    submitted: Mutex<Vec<u64>>,
    lag: Duration,
    defer: bool,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::with_count(0)
    }

    /// Start the processed-order counter at `initial` instead of zero.
    pub fn with_count(initial: u64) -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(initial)),
            submits: AtomicU64::new(0),
            count_reads: AtomicU64::new(0),
            fail_plan: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            lag: Duration::ZERO,
            defer: false,
        }
    }

    /// Per-attempt processing time.
    pub fn lag(mut self, lag: Duration) -> Self {
        self.lag = lag;
        self
    }

    /// Acknowledge submissions immediately and process them in the
    /// background, `lag` later.
    pub fn defer(mut self) -> Self {
        self.defer = true;
        self
    }

    /// Reject the first `times` attempts for `order` with a 500.
    pub fn fail_times(self, order: u64, times: u64) -> Self {
        self.fail_plan.lock().unwrap().insert(order, times);
        self
    }

    pub fn count(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    pub fn submit_attempts(&self) -> u64 {
        self.submits.load(Ordering::Relaxed)
    }

    pub fn count_reads(&self) -> u64 {
        self.count_reads.load(Ordering::Relaxed)
    }

    /// Accepted order ids, sorted.
    pub fn submitted_orders(&self) -> Vec<u64> {
        let mut orders = self.submitted.lock().unwrap().clone();
        orders.sort_unstable();
        orders
    }
}

impl Backend for FakeBackend {
    async fn submit(&self, _endpoint: Endpoint, order: u64) -> Result<(), BackendError> {
        self.submits.fetch_add(1, Ordering::Relaxed);

        if !self.defer && !self.lag.is_zero() {
            tokio::time::sleep(self.lag).await;
        }

        {
            let mut plan = self.fail_plan.lock().unwrap();
            if let Some(remaining) = plan.get_mut(&order) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(BackendError::Status(StatusCode::INTERNAL_SERVER_ERROR));
                }
            }
        }

        self.submitted.lock().unwrap().push(order);
        if self.defer {
            let counter = Arc::clone(&self.counter);
            let lag = self.lag;
            tokio::spawn(async move {
                tokio::time::sleep(lag).await;
                counter.fetch_add(1, Ordering::Relaxed);
            });
        } else {
            self.counter.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    async fn order_count(&self) -> Result<u64, BackendError> {
        self.count_reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.counter.load(Ordering::Relaxed))
    }
}
