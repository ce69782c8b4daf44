//! Data models module
//!
//! Contains the serializable comparison records kept in the results
//! history and printed as JSON.

pub mod record;

// Re-export commonly used types
pub use record::{ComparisonRecord, ContenderRecord};
