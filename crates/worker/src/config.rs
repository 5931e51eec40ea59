use std::time::Duration;

use realty_core::workflow_actions::DEFAULT_ACTION_BATCH_SIZE;

/// Default seconds between queue scans.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database_url: String,
    pub poll_interval: Duration,
    /// Actions processed per tenant per scan.
    pub batch_size: i64,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                     | Required | Default |
    /// |-----------------------------|----------|---------|
    /// | `DATABASE_URL`              | **yes**  | --      |
    /// | `ACTION_POLL_INTERVAL_SECS` | no       | `30`    |
    /// | `ACTION_BATCH_SIZE`         | no       | `100`   |
    ///
    /// # Panics
    ///
    /// Panics if `DATABASE_URL` is missing or a numeric variable does not parse.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let poll_interval_secs: u64 = std::env::var("ACTION_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_SECS.to_string())
            .parse()
            .expect("ACTION_POLL_INTERVAL_SECS must be a valid u64");
        assert!(poll_interval_secs > 0, "ACTION_POLL_INTERVAL_SECS must be positive");

        let batch_size: i64 = std::env::var("ACTION_BATCH_SIZE")
            .unwrap_or_else(|_| DEFAULT_ACTION_BATCH_SIZE.to_string())
            .parse()
            .expect("ACTION_BATCH_SIZE must be a valid i64");

        Self {
            database_url,
            poll_interval: Duration::from_secs(poll_interval_secs),
            batch_size,
        }
    }
}
