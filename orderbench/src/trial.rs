use crate::backend::Backend;
use crate::config::{Endpoint, HarnessConfig};
use crate::error::Error;
use crate::poll::await_processed;
use crate::stats::{SubmitOutcome, TrialResult};
use crate::submit::submit_order;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Run one trial: a wave of `requests` concurrent submissions, then
/// completion detection against the backend counter.
///
/// Order ids are `initial + offset` with the initial counter value read just
/// before the wave, which keeps them unique for as long as nothing else
/// drives the same backend. Both elapsed measurements come from a single
/// starting instant, so `processed_elapsed >= sent_elapsed` always holds.
#[instrument(name = "trial", skip_all, fields(endpoint = %endpoint, requests = requests))]
pub(crate) async fn run_trial<B>(
    backend: &Arc<B>,
    config: &HarnessConfig,
    endpoint: Endpoint,
    requests: u32,
) -> Result<TrialResult, Error>
where
    B: Backend + Send + Sync + 'static,
{
    if requests == 0 {
        // An empty wave completes instantly, without touching the backend.
        return Ok(TrialResult {
            endpoint,
            requests: 0,
            sent_elapsed: Duration::ZERO,
            processed_elapsed: Duration::ZERO,
            failures: 0,
            mean_latency: Duration::ZERO,
        });
    }

    let initial = backend.order_count().await?;
    debug!(initial, "starting wave");

    let start = Instant::now();
    let tasks: Vec<JoinHandle<SubmitOutcome>> = (0..requests)
        .map(|offset| {
            let backend = Arc::clone(backend);
            let max_attempts = config.max_attempts;
            tokio::spawn(async move {
                let order = initial + u64::from(offset);
                submit_order(backend.as_ref(), endpoint, order, max_attempts).await
            })
        })
        .collect();

    let mut outcomes = Vec::with_capacity(tasks.len());
    for task in tasks {
        outcomes.push(task.await.expect("submission task panicked"));
    }
    let sent_elapsed = start.elapsed();

    let failures: u64 = outcomes.iter().map(|o| o.failures).sum();
    let gave_up = outcomes.iter().filter(|o| !o.succeeded).count() as u32;
    if gave_up > 0 {
        // The missing orders will never reach the backend, so polling for
        // them could only end in a timeout.
        return Err(Error::SubmissionsGaveUp { gave_up, requests });
    }

    await_processed(
        backend.as_ref(),
        initial,
        requests,
        config.poll_interval,
        config.completion_timeout,
    )
    .await?;
    let processed_elapsed = start.elapsed();

    let total_latency: Duration = outcomes.iter().map(|o| o.latency).sum();
    let result = TrialResult {
        endpoint,
        requests,
        sent_elapsed,
        processed_elapsed,
        failures,
        mean_latency: total_latency / requests,
    };
    info!(
        sent_ms = sent_elapsed.as_millis() as u64,
        processed_ms = processed_elapsed.as_millis() as u64,
        failures,
        "trial complete"
    );
    Ok(result)
}
