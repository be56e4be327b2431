use crate::backend::Backend;
use crate::config::Endpoint;
use crate::stats::SubmitOutcome;
use std::num::NonZeroU32;
use tokio::time::Instant;
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Submit one order, retrying on any rejection until the gateway accepts it
/// or the optional attempt cap runs out.
///
/// Attempts are back to back with no pause between them. Latency spans the
/// whole call, so time burned on rejected attempts counts toward the
/// successful one.
pub(crate) async fn submit_order<B: Backend>(
    backend: &B,
    endpoint: Endpoint,
    order: u64,
    max_attempts: Option<NonZeroU32>,
) -> SubmitOutcome {
    let start = Instant::now();
    let mut failures: u64 = 0;

    loop {
        match backend.submit(endpoint, order).await {
            Ok(()) => {
                let latency = start.elapsed();
                #[cfg(feature = "metrics")]
                {
                    metrics::counter!("orderbench.submissions").increment(1);
                    metrics::histogram!("orderbench.submission_latency")
                        .record(latency.as_nanos() as f64);
                }
                return SubmitOutcome {
                    order,
                    succeeded: true,
                    failures,
                    latency,
                };
            }
            Err(err) => {
                failures += 1;
                warn!(order, failures, "submission attempt failed: {err}");
                #[cfg(feature = "metrics")]
                metrics::counter!("orderbench.submission_failures").increment(1);

                if let Some(max) = max_attempts {
                    if failures >= u64::from(max.get()) {
                        debug!(order, "giving up after {max} attempts");
                        return SubmitOutcome {
                            order,
                            succeeded: false,
                            failures,
                            latency: start.elapsed(),
                        };
                    }
                }
            }
        }
    }
}
