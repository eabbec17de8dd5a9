//! Wait budget and environment settings.

use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};

/// Minutes a retrieve or deploy waits by default.
pub const DEFAULT_SRC_WAIT_MINUTES: u64 = 33;

/// Smallest accepted `--wait`.
pub const MINIMUM_SRC_WAIT_MINUTES: u64 = 1;

/// Delay between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Overrides [`DEFAULT_POLL_INTERVAL`], in milliseconds.
pub const POLL_INTERVAL_ENV: &str = "SF_SOURCE_POLL_INTERVAL_MS";

/// Default target org when `--targetusername` is absent.
pub const TARGET_ORG_ENV: &str = "SF_TARGET_ORG";

/// How long to poll a remote operation before giving up on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitBudget {
    minutes: u64,
}

impl WaitBudget {
    pub fn from_minutes(minutes: u64) -> Result<Self> {
        if minutes < MINIMUM_SRC_WAIT_MINUTES {
            return Err(Error::new(ErrorKind::InvalidWait(format!(
                "--wait must be at least {} minute(s), got {}",
                MINIMUM_SRC_WAIT_MINUTES, minutes
            ))));
        }
        Ok(Self { minutes })
    }

    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.minutes.saturating_mul(60))
    }
}

impl Default for WaitBudget {
    fn default() -> Self {
        Self {
            minutes: DEFAULT_SRC_WAIT_MINUTES,
        }
    }
}

/// Settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub poll_interval: Duration,
    pub target_org: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            target_org: None,
        }
    }
}

impl SourceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let poll_interval = match lookup(POLL_INTERVAL_ENV) {
            Some(raw) => {
                let millis: u64 = raw.trim().parse().map_err(|_| {
                    Error::new(ErrorKind::Config(format!(
                        "{} must be a whole number of milliseconds, got '{}'",
                        POLL_INTERVAL_ENV, raw
                    )))
                })?;
                if millis == 0 {
                    return Err(Error::new(ErrorKind::Config(format!(
                        "{} must be greater than zero",
                        POLL_INTERVAL_ENV
                    ))));
                }
                Duration::from_millis(millis)
            }
            None => DEFAULT_POLL_INTERVAL,
        };

        let target_org = lookup(TARGET_ORG_ENV).filter(|v| !v.trim().is_empty());

        Ok(Self {
            poll_interval,
            target_org,
        })
    }
}
