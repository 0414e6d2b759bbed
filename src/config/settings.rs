//! Settings seed loading from config.toml
//!
//! The rows listed in config.toml are inserted on startup when their
//! `(parent_code, code)` pair is missing. Existing values are never overwritten,
//! so the seed only provides the initial state of a fresh database.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming the seed file
pub const SETTINGS_CONFIG_ENV: &str = "SETTINGS_CONFIG";

const DEFAULT_SETTINGS_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Settings rows to seed
    #[serde(default)]
    pub settings: Vec<SettingSeed>,
}

/// One seeded setting row
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SettingSeed {
    /// Group the setting belongs to
    pub parent_code: String,
    /// Setting key within its group
    pub code: String,
    /// Initial value
    pub value: String,
    /// Optional display name
    #[serde(default)]
    pub name: Option<String>,
    /// Optional free-form note
    #[serde(default)]
    pub memo: Option<String>,
    /// Whether the setting starts enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

/// Loads settings seeds from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read (`Error::Io`)
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load settings seed from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref)?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads the seed file named by `SETTINGS_CONFIG` (default `./config.toml`).
///
/// A missing file yields an empty configuration; an unreadable or malformed one is an error.
pub fn load_default_config() -> Result<Config> {
    let path =
        std::env::var(SETTINGS_CONFIG_ENV).unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());

    if !Path::new(&path).exists() {
        tracing::warn!("Settings seed file {} not found, skipping seed", path);
        return Ok(Config::default());
    }

    load_config(path)
}
