use std::path::PathBuf;
use std::time::Duration;

use wurk_client::{DEFAULT_BASE_URL, DEFAULT_COOKIE_FILE, DEFAULT_REQUEST_TIMEOUT};

use crate::poller::PollConfig;

/// Default poll interval in milliseconds.
const DEFAULT_POLL_MS: u64 = 1000;

/// Default heartbeat interval in seconds.
const DEFAULT_HEARTBEAT_SECS: u64 = 30;

/// Agent configuration loaded from environment variables.
///
/// Every field has a default; invalid or zero numeric values fall back to
/// the default rather than failing startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub base_url: String,
    pub poll_interval: Duration,
    pub heartbeat_interval: Duration,
    pub request_timeout: Duration,
    pub cookie_file: PathBuf,
    /// Raw `Cookie` header used when the cookie file is unusable.
    pub cookie_header: Option<String>,
}

impl AgentConfig {
    /// | Env Var                | Default               |
    /// |------------------------|-----------------------|
    /// | `WURK_BASE_URL`        | `https://wurk.fun`    |
    /// | `POLL_MS`              | `1000`                |
    /// | `HEARTBEAT_SECS`       | `30`                  |
    /// | `REQUEST_TIMEOUT_SECS` | `20`                  |
    /// | `COOKIE_FILE`          | `cookies_wurk.json`   |
    /// | `WURK_COOKIE`          | —                     |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let positive = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|&n| n > 0)
        };

        Self {
            base_url: lookup("WURK_BASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            poll_interval: Duration::from_millis(positive("POLL_MS").unwrap_or(DEFAULT_POLL_MS)),
            heartbeat_interval: Duration::from_secs(
                positive("HEARTBEAT_SECS").unwrap_or(DEFAULT_HEARTBEAT_SECS),
            ),
            request_timeout: positive("REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            cookie_file: lookup("COOKIE_FILE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COOKIE_FILE.to_string())
                .into(),
            cookie_header: lookup("WURK_COOKIE"),
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: self.poll_interval,
            heartbeat: self.heartbeat_interval,
        }
    }
}
