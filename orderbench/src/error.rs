use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single request against the gateway or backend.
///
/// Submission attempts treat every variant as retryable. Order-count queries
/// do not retry; their failures surface as [`Error::Backend`].
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unexpected status: {0}")]
    Status(StatusCode),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("unparsable order count: {0:?}")]
    InvalidCount(String),
}

/// Harness-level failures. Individual submission rejections never show up
/// here; they are retried and absorbed into the failure count of the trial.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("order count query failed: {0}")]
    Backend(#[from] BackendError),

    #[error("backend processed {observed} of {expected} orders within {timeout:?}")]
    CompletionTimeout {
        expected: u32,
        observed: u64,
        timeout: Duration,
    },

    #[error("{gave_up} of {requests} submissions gave up before succeeding")]
    SubmissionsGaveUp { gave_up: u32, requests: u32 },
}
