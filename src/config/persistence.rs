//! Results persistence module
//!
//! Handles saving, loading, and rotation of comparison records.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::ComparisonRecord;
use crate::{QOrbError, Result, APP_NAME, MAX_RESULTS_HISTORY, RESULTS_FILE};

/// Results storage manager
#[derive(Debug)]
pub struct ResultsStorage {
    results_path: PathBuf,
}

/// Results file structure for JSON persistence
#[derive(Debug, Serialize, Deserialize)]
struct ResultsFile {
    version: u32,
    records: Vec<ComparisonRecord>,
}

impl ResultsStorage {
    /// Create a results storage manager at the standard location
    pub fn new() -> Result<Self> {
        Ok(Self::at(Self::results_file_path()?))
    }

    /// Create a results storage manager for an explicit file
    pub fn at(results_path: PathBuf) -> Self {
        Self { results_path }
    }

    /// Get the standard results file path
    /// Uses $DATA_HOME/qorb/results.json or falls back to $HOME/.local/share/qorb/results.json
    pub fn results_file_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            QOrbError::ConfigError("Unable to determine data directory".to_string())
        })?;

        Ok(data_dir.join(APP_NAME).join(RESULTS_FILE))
    }

    /// Load all records from the results file
    pub fn load_records(&self) -> Result<Vec<ComparisonRecord>> {
        if !self.results_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.results_path).map_err(|e| {
            QOrbError::PersistenceError(format!(
                "Failed to read results file {}: {}",
                self.results_path.display(),
                e
            ))
        })?;

        let results_file: ResultsFile = serde_json::from_str(&content).map_err(|e| {
            QOrbError::PersistenceError(format!(
                "Failed to parse results file {}: {}",
                self.results_path.display(),
                e
            ))
        })?;

        Ok(results_file.records)
    }

    /// Append records to the results file
    /// Only the newest MAX_RESULTS_HISTORY records are kept
    pub fn append_records(&self, new_records: Vec<ComparisonRecord>) -> Result<()> {
        let mut records = self.load_records()?;
        records.extend(new_records);

        if records.len() > MAX_RESULTS_HISTORY {
            let skip_count = records.len() - MAX_RESULTS_HISTORY;
            records.drain(..skip_count);
        }

        self.save_records(records)
    }

    fn save_records(&self, records: Vec<ComparisonRecord>) -> Result<()> {
        if let Some(parent) = self.results_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                QOrbError::PersistenceError(format!(
                    "Failed to create results directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let results_file = ResultsFile {
            version: 1,
            records,
        };
        let content = serde_json::to_string_pretty(&results_file)?;

        fs::write(&self.results_path, content).map_err(|e| {
            QOrbError::PersistenceError(format!(
                "Failed to write results file {}: {}",
                self.results_path.display(),
                e
            ))
        })?;

        log::debug!(
            "Saved {} records to {}",
            results_file.records.len(),
            self.results_path.display()
        );
        Ok(())
    }

    /// Clear all stored records
    pub fn clear_records(&self) -> Result<()> {
        if self.results_path.exists() {
            fs::remove_file(&self.results_path).map_err(|e| {
                QOrbError::PersistenceError(format!(
                    "Failed to remove results file {}: {}",
                    self.results_path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Get the most recent N records, newest first
    pub fn get_recent_records(&self, count: usize) -> Result<Vec<ComparisonRecord>> {
        let mut records = self.load_records()?;
        records.reverse();
        records.truncate(count);
        Ok(records)
    }

    /// Get results file path for external access
    pub fn results_path(&self) -> &Path {
        &self.results_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::{ComparisonReport, Contender, TimedCall};
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_test_record(marker: u64) -> ComparisonRecord {
        let report = ComparisonReport::from_calls(
            Contender::new("bulk", TimedCall::new((), Duration::from_millis(1))),
            Contender::new("loop", TimedCall::new((), Duration::from_millis(marker))),
            false,
            100,
        );
        ComparisonRecord::from_report(&report, "demo", format!("scenario {}", marker))
    }

    fn storage_in(temp_dir: &TempDir) -> ResultsStorage {
        ResultsStorage::at(temp_dir.path().join("results.json"))
    }

    #[test]
    fn test_load_empty_records() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);
        assert!(storage.load_records().unwrap().is_empty());
    }

    #[test]
    fn test_append_and_load_records() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);

        storage
            .append_records(vec![create_test_record(3), create_test_record(4)])
            .unwrap();

        let records = storage.load_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].scenario, "scenario 3");
        assert_eq!(records[1].second.elapsed, Duration::from_millis(4));
    }

    #[test]
    fn test_records_rotation() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);

        for i in 0..(MAX_RESULTS_HISTORY + 10) as u64 {
            storage.append_records(vec![create_test_record(i)]).unwrap();
        }

        let records = storage.load_records().unwrap();
        assert_eq!(records.len(), MAX_RESULTS_HISTORY);
        assert_eq!(records[0].scenario, "scenario 10");
        assert_eq!(
            records[records.len() - 1].scenario,
            format!("scenario {}", MAX_RESULTS_HISTORY + 9)
        );
    }

    #[test]
    fn test_clear_records() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);

        storage
            .append_records((0..5).map(create_test_record).collect())
            .unwrap();
        assert_eq!(storage.load_records().unwrap().len(), 5);

        storage.clear_records().unwrap();
        assert!(storage.load_records().unwrap().is_empty());
        // Clearing twice is fine
        storage.clear_records().unwrap();
    }

    #[test]
    fn test_get_recent_records() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);
        storage
            .append_records((0..10).map(create_test_record).collect())
            .unwrap();

        let recent = storage.get_recent_records(5).unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].scenario, "scenario 9");
        assert_eq!(recent[4].scenario, "scenario 5");

        let all = storage.get_recent_records(20).unwrap();
        assert_eq!(all.len(), 10);
        assert_eq!(all[9].scenario, "scenario 0");
    }

    #[test]
    fn test_results_file_format() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);
        storage.append_records(vec![create_test_record(2)]).unwrap();

        let content = fs::read_to_string(storage.results_path()).unwrap();
        let results_file: ResultsFile = serde_json::from_str(&content).unwrap();
        assert_eq!(results_file.version, 1);
        assert_eq!(results_file.records.len(), 1);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);
        fs::write(storage.results_path(), "not json").unwrap();
        assert!(matches!(
            storage.load_records(),
            Err(QOrbError::PersistenceError(_))
        ));
    }
}
