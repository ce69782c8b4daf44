//! Comparison record data model
//!
//! A result-free, serializable summary of one comparison, used for JSON
//! output and the results history.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bench::{ComparisonReport, Side, SpeedRatio};

/// Summary of one comparison between two query strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRecord {
    /// When the comparison finished
    pub timestamp: DateTime<Utc>,
    /// Suite the scenario belongs to (demo, challenge, optimize)
    pub suite: String,
    /// Short description of the scenario
    pub scenario: String,
    /// First contender
    pub first: ContenderRecord,
    /// Second contender
    pub second: ContenderRecord,
    /// Which contender was faster
    pub faster: Side,
    /// Slower-to-faster ratio
    pub ratio: SpeedRatio,
    /// `None` when results were not compared
    pub results_equal: Option<bool>,
}

/// Name and latency of one contender
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContenderRecord {
    pub name: String,
    #[serde(with = "duration_serde")]
    pub elapsed: Duration,
}

impl ComparisonRecord {
    /// Capture a report under the given suite and scenario labels
    pub fn from_report<T>(
        report: &ComparisonReport<T>,
        suite: impl Into<String>,
        scenario: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            suite: suite.into(),
            scenario: scenario.into(),
            first: ContenderRecord {
                name: report.first().name.clone(),
                elapsed: report.first().elapsed(),
            },
            second: ContenderRecord {
                name: report.second().name.clone(),
                elapsed: report.second().elapsed(),
            },
            faster: report.faster_side(),
            ratio: report.ratio(),
            results_equal: report.results_equal(),
        }
    }

    pub fn faster(&self) -> &ContenderRecord {
        match self.faster {
            Side::First => &self.first,
            Side::Second => &self.second,
        }
    }

    pub fn slower(&self) -> &ContenderRecord {
        match self.faster {
            Side::First => &self.second,
            Side::Second => &self.first,
        }
    }

    /// Get a one-line summary of the record
    pub fn summary(&self) -> String {
        let equality = match self.results_equal {
            Some(true) => " - same results",
            Some(false) => " - DIFFERENT results",
            None => "",
        };
        format!(
            "{} - {}/{} - {} {} faster than {}{}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.suite,
            self.scenario,
            self.faster().name,
            self.ratio,
            self.slower().name,
            equality
        )
    }
}

impl fmt::Display for ComparisonRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

// Durations are stored as nanoseconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_nanos() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}
