//! Comparison harness module
//!
//! Times pairs of equivalent callables and summarizes their relative
//! latency and result equivalence.

pub mod compare;

// Re-export commonly used types
pub use compare::{
    compare, compare_runtimes, time_call, time_infallible, Comparator, ComparisonReport,
    Contender, Side, SpeedRatio, TimedCall,
};
