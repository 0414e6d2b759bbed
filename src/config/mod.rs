/// Database configuration and connection management
pub mod database;

/// Telemetry engine settings from environment variables
pub mod engine;

/// Settings seed loading from config.toml
pub mod settings;
