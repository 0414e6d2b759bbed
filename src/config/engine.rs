//! Telemetry engine configuration from environment variables.
//!
//! Reads `TELEMETRY_GROUP`, `TELEMETRY_TICK_MS`, and `TELEMETRY_TRANSACTIONAL`,
//! falling back to group `APP_SETTING`, a 5 second tick, and per-field commits.

use crate::core::snapshot::SETTING_GROUP;
use crate::errors::{Error, Result};
use std::time::Duration;

/// Default tick period in milliseconds
pub const DEFAULT_TICK_MS: u64 = 5000;

/// Settings driving the periodic telemetry engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Parent code of the telemetry settings group
    pub group_code: String,
    /// Fixed period between ticks
    pub tick_interval: Duration,
    /// Wrap each tick in a single database transaction
    pub transactional: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            group_code: SETTING_GROUP.to_string(),
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            transactional: false,
        }
    }
}

impl EngineConfig {
    /// Reads the engine configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, applying defaults for absent keys.
    ///
    /// # Errors
    /// Returns `Error::Config` if the tick period is not a positive integer, the group
    /// code is blank, or the transactional flag is not a boolean.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(group_code) = lookup("TELEMETRY_GROUP") {
            if group_code.trim().is_empty() {
                return Err(Error::Config {
                    message: "TELEMETRY_GROUP cannot be empty".to_string(),
                });
            }
            config.group_code = group_code.trim().to_string();
        }

        if let Some(raw) = lookup("TELEMETRY_TICK_MS") {
            let millis = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| Error::Config {
                    message: format!("TELEMETRY_TICK_MS must be a positive integer, got {raw:?}"),
                })?;
            config.tick_interval = Duration::from_millis(millis);
        }

        if let Some(raw) = lookup("TELEMETRY_TRANSACTIONAL") {
            config.transactional = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(Error::Config {
                        message: format!("TELEMETRY_TRANSACTIONAL must be a boolean, got {raw:?}"),
                    });
                }
            };
        }

        Ok(config)
    }
}
