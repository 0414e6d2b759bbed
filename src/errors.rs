//! Unified error types for the vehicle dashboard service.

use thiserror::Error;

/// Every failure the settings store, snapshot assembler, and telemetry engine can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration (env vars, seed file, blank keys)
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what was wrong
        message: String,
    },

    /// The settings group has no rows at all
    #[error("Settings group not found: {group_code}")]
    GroupNotFound {
        /// Parent code that was looked up
        group_code: String,
    },

    /// No row exists for the `(group_code, code)` pair
    #[error("Setting not found: {group_code}-{code}")]
    SettingNotFound {
        /// Parent code of the missing setting
        group_code: String,
        /// Code of the missing setting
        code: String,
    },

    /// No row exists with the given primary key
    #[error("Setting not found: id {id}")]
    SettingIdNotFound {
        /// Primary key that was looked up
        id: i64,
    },

    /// A row already exists for the `(group_code, code)` pair
    #[error("Setting already exists: {group_code}-{code}")]
    DuplicateSetting {
        /// Parent code of the existing setting
        group_code: String,
        /// Code of the existing setting
        code: String,
    },

    /// Error bubbled up from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
