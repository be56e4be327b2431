use std::time::Duration;

/// Default pause between order-count queries while waiting for a wave to be
/// fully processed.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default ceiling on how long a trial waits for the backend to catch up
/// before failing.
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);
