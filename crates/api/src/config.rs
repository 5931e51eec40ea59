use std::str::FromStr;

use realty_core::workflow_actions::{clamp_batch_size, DEFAULT_ACTION_BATCH_SIZE};

use crate::auth::jwt::JwtConfig;

/// Settings for the workflow HTTP service.
///
/// Only `JWT_SECRET` is mandatory; everything else falls back to a local
/// development value.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins of the CRM frontends allowed to call the API.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Batch used by `POST /workflow/actions/process` when the request does
    /// not name one. Always within the action batch bounds.
    pub action_batch_size: i64,
    /// How long the event log may keep draining after the server stops.
    pub event_log_drain_secs: u64,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Read the configuration from the environment.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `3000`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `ACTION_BATCH_SIZE`    | `100`                   |
    /// | `EVENT_LOG_DRAIN_SECS` | `5`                     |
    ///
    /// `DATABASE_URL` is read by the binary; the JWT variables are listed on
    /// [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 3000),
            cors_origins: parse_origins(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
            ),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            action_batch_size: clamp_batch_size(Some(env_or(
                "ACTION_BATCH_SIZE",
                DEFAULT_ACTION_BATCH_SIZE,
            ))),
            event_log_drain_secs: env_or("EVENT_LOG_DRAIN_SECS", 5),
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Parse `name` from the environment, or use `default` when it is unset.
///
/// Panics on a value that does not parse; this runs once at startup.
fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{name} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
