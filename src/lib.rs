//! QORB - Query ORM Rust Bench
//!
//! Times alternative data-access strategies against the same SQLite
//! library database and reports which one was faster, by how much,
//! and whether both produced the same result.

use thiserror::Error;

// Public re-exports
pub mod bench;
pub mod config;
pub mod models;
pub mod queries;
pub mod store;
pub mod suite;
pub mod util;

// Common error types
#[derive(Debug, Error)]
pub enum QOrbError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// SQLite statement or connection failure
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    /// Configuration validation or parsing error
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// A row the query expected to exist was missing
    #[error("Not found: {0}")]
    NotFound(String),
    /// Results history persistence error
    #[error("Results persistence error: {0}")]
    PersistenceError(String),
    /// Comparison or suite execution error
    #[error("Benchmark error: {0}")]
    BenchmarkError(String),
}

impl From<serde_json::Error> for QOrbError {
    fn from(err: serde_json::Error) -> Self {
        QOrbError::PersistenceError(format!("JSON serialization error: {}", err))
    }
}

impl From<toml::de::Error> for QOrbError {
    fn from(err: toml::de::Error) -> Self {
        QOrbError::ConfigError(format!("TOML parsing error: {}", err))
    }
}

impl From<toml::ser::Error> for QOrbError {
    fn from(err: toml::ser::Error) -> Self {
        QOrbError::ConfigError(format!("TOML serialization error: {}", err))
    }
}

/// Result type alias for QORB operations
pub type Result<T> = std::result::Result<T, QOrbError>;

/// Error handling utilities
pub mod error {
    use super::QOrbError;

    /// Convert error to user-friendly message with suggestions
    pub fn user_friendly_message(error: &QOrbError) -> String {
        match error {
            QOrbError::DatabaseError(err) => format!(
                "Database query failed: {}. Try `qorb seed` or point --database at a fresh file.",
                err
            ),
            QOrbError::NotFound(what) => {
                format!("{} does not exist. The library may be seeded with fewer rows.", what)
            }
            QOrbError::ConfigError(msg) => {
                format!("Configuration error: {}. Check your settings.", msg)
            }
            QOrbError::PersistenceError(_) => {
                "Failed to save results. Check disk space and permissions.".to_string()
            }
            _ => error.to_string(),
        }
    }
}

// Common types and constants
pub const APP_NAME: &str = "qorb";
pub const CONFIG_FILE: &str = "qorb.toml";
pub const DATABASE_FILE: &str = "library.sqlite3";
pub const RESULTS_FILE: &str = "results.json";
pub const MAX_RESULTS_HISTORY: usize = 100;
/// Characters of a mismatched result shown in a report
pub const PREVIEW_CHARS: usize = 100;
