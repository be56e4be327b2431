use crate::backend::Backend;
use crate::error::Error;
use std::time::Duration;
use tokio::time::Instant;
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Wait until the backend's processed-order counter has advanced by
/// `expected` over `initial`, querying every `interval`.
///
/// The counter is compared as a delta, so a backend that was already serving
/// other traffic before the wave started does not confuse completion
/// detection. With `timeout = None` this loops for as long as the backend
/// withholds the last order.
pub(crate) async fn await_processed<B: Backend>(
    backend: &B,
    initial: u64,
    expected: u32,
    interval: Duration,
    timeout: Option<Duration>,
) -> Result<(), Error> {
    let deadline = timeout.map(|t| Instant::now() + t);

    loop {
        let current = backend.order_count().await?;
        let observed = current.saturating_sub(initial);
        if observed >= u64::from(expected) {
            return Ok(());
        }
        trace!(observed, expected, "waiting for the backend to catch up");

        if let (Some(deadline), Some(timeout)) = (deadline, timeout) {
            if Instant::now() >= deadline {
                return Err(Error::CompletionTimeout {
                    expected,
                    observed,
                    timeout,
                });
            }
        }
        tokio::time::sleep(interval).await;
    }
}
