//! Utility functions module
//!
//! Contains helper functions for formatting latencies, sizes and
//! result previews.

pub mod units;

// Re-export commonly used functions
pub use units::{duration_to_millis, format_bytes, format_elapsed, format_millis, truncate_preview};
