//! Configuration management module
//!
//! Handles loading, saving, and validation of bench configuration
//! and user preferences.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::ComparisonRecord;
use crate::{QOrbError, Result, APP_NAME, CONFIG_FILE, DATABASE_FILE, PREVIEW_CHARS};

pub mod persistence;

/// Largest supported number of generated authors
pub const MAX_BULK_AUTHORS: usize = 1_000_000;

/// Bench configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// SQLite library database file
    pub database_path: PathBuf,
    /// Number of generated single-book authors when seeding
    pub bulk_authors: usize,
    /// Characters of each mismatched result shown in a report
    pub preview_chars: usize,
    /// Append every comparison to the results history
    pub save_results: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            bulk_authors: 100_000,
            preview_chars: PREVIEW_CHARS,
            save_results: false,
        }
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATABASE_FILE)
}

impl BenchConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Small configuration suited to quick runs and tests
    pub fn quick() -> Self {
        Self {
            bulk_authors: 1_000,
            ..Self::default()
        }
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(QOrbError::ConfigError(
                "Database path must not be empty".to_string(),
            ));
        }

        if self.database_path.is_dir() {
            return Err(QOrbError::ConfigError(format!(
                "Database path is a directory: {}",
                self.database_path.display()
            )));
        }

        if self.bulk_authors > MAX_BULK_AUTHORS {
            return Err(QOrbError::ConfigError(format!(
                "Too many bulk authors: {} (max: {})",
                self.bulk_authors, MAX_BULK_AUTHORS
            )));
        }

        if self.preview_chars == 0 {
            return Err(QOrbError::ConfigError(
                "Preview length must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Set the library database path
    pub fn with_database_path(mut self, path: PathBuf) -> Self {
        self.database_path = path;
        self
    }

    /// Set the number of generated authors
    pub fn with_bulk_authors(mut self, count: usize) -> Self {
        self.bulk_authors = count;
        self
    }

    /// Set the preview length for mismatched results
    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }

    /// Set whether comparisons are appended to the history
    pub fn with_save_results(mut self, save: bool) -> Self {
        self.save_results = save;
        self
    }

    /// Load configuration from the standard config file location
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load configuration from `path`, defaulting when it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            QOrbError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            QOrbError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to the standard config file location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                QOrbError::ConfigError(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(path, content).map_err(|e| {
            QOrbError::ConfigError(format!(
                "Failed to write config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Get the standard configuration file path
    /// Uses $CONFIG_HOME/qorb/qorb.toml or falls back to $HOME/.config/qorb/qorb.toml
    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            QOrbError::ConfigError("Unable to determine config directory".to_string())
        })?;

        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

/// Configuration manager for handling config and results persistence
pub struct ConfigManager {
    config_path: PathBuf,
    results_storage: persistence::ResultsStorage,
}

impl ConfigManager {
    /// Create a manager for the standard file locations
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: BenchConfig::config_file_path()?,
            results_storage: persistence::ResultsStorage::new()?,
        })
    }

    /// Create a manager for explicit file locations
    pub fn with_paths(config_path: PathBuf, results_path: PathBuf) -> Self {
        Self {
            config_path,
            results_storage: persistence::ResultsStorage::at(results_path),
        }
    }

    /// Load configuration from file or return default
    pub fn load_config(&self) -> Result<BenchConfig> {
        BenchConfig::load_from(&self.config_path)
    }

    /// Save configuration to file
    pub fn save_config(&self, config: &BenchConfig) -> Result<()> {
        config.save_to(&self.config_path)
    }

    /// Append comparison records to the history
    pub fn save_records(&self, records: Vec<ComparisonRecord>) -> Result<()> {
        self.results_storage.append_records(records)
    }

    /// Get the most recent records (up to limit), newest first
    pub fn get_recent_records(&self, limit: usize) -> Result<Vec<ComparisonRecord>> {
        self.results_storage.get_recent_records(limit)
    }

    /// Remove the results history
    pub fn clear_records(&self) -> Result<()> {
        self.results_storage.clear_records()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = BenchConfig::default();
        assert_eq!(config.bulk_authors, 100_000);
        assert_eq!(config.preview_chars, 100);
        assert!(!config.save_results);
        assert!(config.validate().is_ok());
        assert!(config
            .database_path
            .to_string_lossy()
            .ends_with("library.sqlite3"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(BenchConfig::new().with_preview_chars(0).validate().is_err());
        assert!(BenchConfig::new()
            .with_bulk_authors(MAX_BULK_AUTHORS + 1)
            .validate()
            .is_err());
        assert!(BenchConfig::new()
            .with_database_path(PathBuf::new())
            .validate()
            .is_err());

        let temp_dir = TempDir::new().unwrap();
        assert!(BenchConfig::new()
            .with_database_path(temp_dir.path().to_path_buf())
            .validate()
            .is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("qorb").join("qorb.toml");

        let config = BenchConfig::quick()
            .with_database_path(temp_dir.path().join("lib.sqlite3"))
            .with_preview_chars(40)
            .with_save_results(true);
        config.save_to(&path).unwrap();

        let loaded = BenchConfig::load_from(&path).unwrap();
        assert_eq!(loaded.database_path, config.database_path);
        assert_eq!(loaded.bulk_authors, 1_000);
        assert_eq!(loaded.preview_chars, 40);
        assert!(loaded.save_results);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = BenchConfig::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.bulk_authors, BenchConfig::default().bulk_authors);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("qorb.toml");
        fs::write(&path, "bulk_authors = 250\n").unwrap();

        let loaded = BenchConfig::load_from(&path).unwrap();
        assert_eq!(loaded.bulk_authors, 250);
        assert_eq!(loaded.preview_chars, PREVIEW_CHARS);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("qorb.toml");
        fs::write(&path, "preview_chars = 0\n").unwrap();
        assert!(matches!(
            BenchConfig::load_from(&path),
            Err(QOrbError::ConfigError(_))
        ));
    }

    #[test]
    fn test_manager_recent_records_newest_first() {
        use crate::bench::{ComparisonReport, Contender, TimedCall};
        use std::time::Duration;

        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_paths(
            temp_dir.path().join("qorb.toml"),
            temp_dir.path().join("results.json"),
        );
        for scenario in ["first run", "second run", "third run"] {
            let report = ComparisonReport::from_calls(
                Contender::new("a", TimedCall::new(1, Duration::from_millis(1))),
                Contender::new("b", TimedCall::new(1, Duration::from_millis(2))),
                true,
                100,
            );
            manager
                .save_records(vec![ComparisonRecord::from_report(&report, "demo", scenario)])
                .unwrap();
        }

        let recent = manager.get_recent_records(2).unwrap();
        let scenarios: Vec<&str> = recent.iter().map(|r| r.scenario.as_str()).collect();
        assert_eq!(scenarios, vec!["third run", "second run"]);
    }

    #[test]
    fn test_config_file_path() {
        let path = BenchConfig::config_file_path();
        assert!(path.is_ok());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("qorb"));
        assert!(path.to_string_lossy().contains("qorb.toml"));
    }
}
