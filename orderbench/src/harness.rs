use crate::backend::Backend;
use crate::config::{Endpoint, HarnessConfig, TrialConfig};
use crate::error::Error;
use crate::stats::{TrialResult, TrialSummary};
use crate::trial::run_trial;
use std::sync::Arc;
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Drives trials against one backend.
///
/// Trials never overlap: a wave starts only after the previous one has been
/// confirmed processed, so every counter delta stays attributable to exactly
/// one wave.
pub struct Harness<B> {
    backend: Arc<B>,
    config: HarnessConfig,
}

impl<B> Harness<B>
where
    B: Backend + Send + Sync + 'static,
{
    pub fn new(backend: B, config: HarnessConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            config,
        }
    }

    /// The backend this harness drives.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Reachability probe, for failing fast before a long run. Returns the
    /// current counter value.
    pub async fn check_backend(&self) -> Result<u64, Error> {
        Ok(self.backend.order_count().await?)
    }

    /// Run a single trial of `requests` concurrent submissions.
    ///
    /// `requests = 0` yields an all-zero result without touching the
    /// backend.
    pub async fn run_trial(
        &self,
        endpoint: Endpoint,
        requests: u32,
    ) -> Result<TrialResult, Error> {
        run_trial(&self.backend, &self.config, endpoint, requests).await
    }

    /// Run `config.repeats` trials back to back and average them.
    ///
    /// The first failing trial aborts the whole configuration; partial
    /// averages would not be comparable across configurations.
    #[instrument(name = "configuration", skip_all, fields(endpoint = %config.endpoint, requests = config.requests))]
    pub async fn run_repeated(&self, config: &TrialConfig) -> Result<TrialSummary, Error> {
        config.validate()?;

        let mut trials = Vec::with_capacity(config.repeats as usize);
        for run in 1..=config.repeats {
            debug!(run, of = config.repeats, "starting trial");
            trials.push(self.run_trial(config.endpoint, config.requests).await?);
        }

        Ok(TrialSummary::from_trials(&trials))
    }
}
