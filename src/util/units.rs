//! Units formatting utilities
//!
//! Provides human-readable formatting of latencies, sizes and result
//! previews used in comparison reports.

use std::time::Duration;

use byte_unit::{Byte, UnitType};

/// Format milliseconds with one decimal place
///
/// # Examples
/// ```
/// use qorb::util::units::format_millis;
///
/// assert_eq!(format_millis(12.345), "12.3");
/// assert_eq!(format_millis(0.0), "0.0");
/// ```
pub fn format_millis(ms: f64) -> String {
    format!("{:.1}", ms)
}

/// Convert a duration into fractional milliseconds
pub fn duration_to_millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Cut `text` to at most `limit` characters, appending `...` when
/// anything was dropped. Never splits a multi-byte character.
///
/// # Examples
/// ```
/// use qorb::util::units::truncate_preview;
///
/// assert_eq!(truncate_preview("short", 100), "short");
/// assert_eq!(truncate_preview("abcdef", 3), "abc...");
/// ```
pub fn truncate_preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Format bytes into human-readable size with binary units
///
/// # Examples
/// ```
/// use qorb::util::units::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 B");
/// assert!(format_bytes(2048).contains("KiB"));
/// ```
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let adjusted = Byte::from_u64(bytes).get_appropriate_unit(UnitType::Binary);
    format!("{:.1}", adjusted)
}

/// Format a wall-clock duration at millisecond precision
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use qorb::util::units::format_elapsed;
///
/// assert_eq!(format_elapsed(Duration::from_millis(1500)), "1s 500ms");
/// ```
pub fn format_elapsed(duration: Duration) -> String {
    let millis = Duration::from_millis(duration.as_millis() as u64);
    if millis.is_zero() {
        return "0ms".to_string();
    }
    humantime::format_duration(millis).to_string()
}
