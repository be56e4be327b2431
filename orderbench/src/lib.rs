#![doc = include_str!("../README.md")]

pub(crate) mod backend;
pub(crate) mod config;
pub(crate) mod constants;
pub(crate) mod error;
pub(crate) mod harness;
pub(crate) mod poll;
pub(crate) mod report;
pub(crate) mod stats;
pub(crate) mod submit;
pub(crate) mod trial;

#[cfg(test)]
pub(crate) mod testutil;

pub use backend::{Backend, HttpBackend};
pub use config::{Endpoint, HarnessConfig, TrialConfig};
pub use constants::{DEFAULT_COMPLETION_TIMEOUT, DEFAULT_POLL_INTERVAL};
pub use error::{BackendError, Error};
pub use harness::Harness;
pub use report::render_table;
pub use stats::{SubmitOutcome, TrialResult, TrialSummary};
