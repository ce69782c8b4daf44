//! Comparison harness
//!
//! Times two implementations of the same logical query, one after the
//! other on the calling thread, and reports which was faster, by what
//! multiple, and whether both returned the same result.

use std::cmp::Ordering;
use std::fmt;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::util::units::{duration_to_millis, format_millis, truncate_preview};
use crate::PREVIEW_CHARS;

/// Result of invoking a callable exactly once
#[derive(Debug, Clone, PartialEq)]
pub struct TimedCall<T> {
    /// Value returned by the callable
    pub result: T,
    /// Wall-clock latency of the single invocation
    pub elapsed: Duration,
}

impl<T> TimedCall<T> {
    /// Create a timed call from an already measured result
    pub fn new(result: T, elapsed: Duration) -> Self {
        Self { result, elapsed }
    }

    /// Elapsed time in fractional milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        duration_to_millis(self.elapsed)
    }
}

/// Invoke `f` once and measure how long it took.
///
/// An error returned by `f` is handed back untouched; a failed call has
/// no meaningful latency so nothing is recorded for it.
pub fn time_call<T, E, F>(f: F) -> Result<TimedCall<T>, E>
where
    F: FnOnce() -> Result<T, E>,
{
    let start = Instant::now();
    let result = f()?;
    let elapsed = start.elapsed();
    Ok(TimedCall { result, elapsed })
}

/// Invoke an infallible `f` once and measure how long it took.
pub fn time_infallible<T, F>(f: F) -> TimedCall<T>
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    TimedCall {
        result,
        elapsed: start.elapsed(),
    }
}

/// How many times faster the faster contender was
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpeedRatio {
    /// slower_ms / faster_ms
    Times(f64),
    /// The faster call took no measurable time
    Infinite,
}

impl SpeedRatio {
    /// Ratio of `slower` to `faster`, or `Infinite` when `faster` is zero
    pub fn between(faster: Duration, slower: Duration) -> Self {
        if faster.is_zero() {
            return SpeedRatio::Infinite;
        }
        SpeedRatio::Times(slower.as_secs_f64() / faster.as_secs_f64())
    }

    /// Numeric value, `f64::INFINITY` for the sentinel
    pub fn as_f64(&self) -> f64 {
        match self {
            SpeedRatio::Times(ratio) => *ratio,
            SpeedRatio::Infinite => f64::INFINITY,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, SpeedRatio::Infinite)
    }
}

impl fmt::Display for SpeedRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedRatio::Times(ratio) => write!(f, "{:.0} times", ratio),
            SpeedRatio::Infinite => write!(f, "infinitely"),
        }
    }
}

/// Which of the two contenders a statement refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

/// A named, timed invocation taking part in a comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Contender<T> {
    pub name: String,
    pub call: TimedCall<T>,
}

impl<T> Contender<T> {
    pub fn new(name: impl Into<String>, call: TimedCall<T>) -> Self {
        Self {
            name: name.into(),
            call,
        }
    }

    pub fn result(&self) -> &T {
        &self.call.result
    }

    pub fn elapsed(&self) -> Duration {
        self.call.elapsed
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.call.elapsed_ms()
    }
}

/// Outcome of timing two equivalent callables
#[derive(Debug, Clone)]
pub struct ComparisonReport<T> {
    first: Contender<T>,
    second: Contender<T>,
    faster: Side,
    ratio: SpeedRatio,
    results_equal: Option<bool>,
    previews: Option<(String, String)>,
}

impl<T: PartialEq + fmt::Debug> ComparisonReport<T> {
    /// Build a report from two completed invocations.
    ///
    /// Equality is only evaluated when `check_equality` is set. Previews are
    /// kept only for mismatching results and are cut to `preview_chars`.
    ///
    /// Previews are the `Debug` rendering of each result, so string results
    /// appear quoted (`"A"`, not `A`) and the quotes count toward the limit.
    pub fn from_calls(
        first: Contender<T>,
        second: Contender<T>,
        check_equality: bool,
        preview_chars: usize,
    ) -> Self {
        let faster = pick_faster(&first, &second);
        let (fast, slow) = match faster {
            Side::First => (&first, &second),
            Side::Second => (&second, &first),
        };
        let ratio = SpeedRatio::between(fast.elapsed(), slow.elapsed());

        let results_equal = check_equality.then(|| first.result() == second.result());
        let previews = match results_equal {
            Some(false) => Some((
                truncate_preview(&format!("{:?}", first.result()), preview_chars),
                truncate_preview(&format!("{:?}", second.result()), preview_chars),
            )),
            _ => None,
        };

        Self {
            first,
            second,
            faster,
            ratio,
            results_equal,
            previews,
        }
    }
}

impl<T> ComparisonReport<T> {
    pub fn first(&self) -> &Contender<T> {
        &self.first
    }

    pub fn second(&self) -> &Contender<T> {
        &self.second
    }

    pub fn faster_side(&self) -> Side {
        self.faster
    }

    pub fn faster(&self) -> &Contender<T> {
        self.contender(self.faster)
    }

    pub fn slower(&self) -> &Contender<T> {
        self.contender(self.faster.other())
    }

    pub fn contender(&self, side: Side) -> &Contender<T> {
        match side {
            Side::First => &self.first,
            Side::Second => &self.second,
        }
    }

    pub fn ratio(&self) -> SpeedRatio {
        self.ratio
    }

    /// `None` when equality checking was disabled
    pub fn results_equal(&self) -> Option<bool> {
        self.results_equal
    }

    /// Truncated renderings of both results, present only on mismatch
    pub fn previews(&self) -> Option<(&str, &str)> {
        self.previews
            .as_ref()
            .map(|(first, second)| (first.as_str(), second.as_str()))
    }

    /// The single speed summary line
    pub fn summary_line(&self) -> String {
        let faster = self.faster();
        let slower = self.slower();
        format!(
            "{} was {} faster than {} ({} milliseconds vs. {} milliseconds)",
            faster.name,
            self.ratio,
            slower.name,
            format_millis(faster.elapsed_ms()),
            format_millis(slower.elapsed_ms()),
        )
    }

    /// All report lines in print order
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(equal) = self.results_equal {
            lines.push(String::new());
            lines.push(format!(
                "Comparing {} and {}",
                self.first.name, self.second.name
            ));
            lines.push(format!(
                "Results were {}the same",
                if equal { "" } else { "NOT " }
            ));
            if let Some((first, second)) = self.previews() {
                lines.push(format!("{} -  {}", self.first.name, first));
                lines.push(format!("{} -  {}", self.second.name, second));
            }
        }

        lines.push(self.summary_line());
        lines
    }

    /// Write the report to `out`, one line at a time
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for line in self.lines() {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    /// Print the report to standard output
    pub fn print(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.write_to(&mut handle)
    }
}

impl<T> fmt::Display for ComparisonReport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

// Exact ties carry no signal at this resolution; break them by name so
// the designation is at least stable.
fn pick_faster<T>(first: &Contender<T>, second: &Contender<T>) -> Side {
    match first
        .elapsed()
        .cmp(&second.elapsed())
        .then_with(|| first.name.cmp(&second.name))
    {
        Ordering::Greater => Side::Second,
        Ordering::Less | Ordering::Equal => Side::First,
    }
}

/// Comparison settings
#[derive(Debug, Clone, Copy)]
pub struct Comparator {
    check_equality: bool,
    preview_chars: usize,
}

impl Default for Comparator {
    fn default() -> Self {
        Self {
            check_equality: true,
            preview_chars: PREVIEW_CHARS,
        }
    }
}

impl Comparator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable result equality checking
    pub fn with_equality_check(mut self, check: bool) -> Self {
        self.check_equality = check;
        self
    }

    /// Set the preview length used for mismatched results
    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }

    /// Time `f_a` then `f_b` and build a report.
    ///
    /// The calls never overlap. If `f_a` fails, `f_b` is not invoked.
    pub fn run<T, E, FA, FB>(
        &self,
        name_a: &str,
        f_a: FA,
        name_b: &str,
        f_b: FB,
    ) -> Result<ComparisonReport<T>, E>
    where
        T: PartialEq + fmt::Debug,
        FA: FnOnce() -> Result<T, E>,
        FB: FnOnce() -> Result<T, E>,
    {
        let first = Contender::new(name_a, time_call(f_a)?);
        log::debug!("{} finished in {:.3} ms", name_a, first.elapsed_ms());

        let second = Contender::new(name_b, time_call(f_b)?);
        log::debug!("{} finished in {:.3} ms", name_b, second.elapsed_ms());

        Ok(ComparisonReport::from_calls(
            first,
            second,
            self.check_equality,
            self.preview_chars,
        ))
    }
}

/// Time two callables and compare their results.
pub fn compare<T, E, FA, FB>(
    name_a: &str,
    f_a: FA,
    name_b: &str,
    f_b: FB,
    check_equality: bool,
) -> Result<ComparisonReport<T>, E>
where
    T: PartialEq + fmt::Debug,
    FA: FnOnce() -> Result<T, E>,
    FB: FnOnce() -> Result<T, E>,
{
    Comparator::new()
        .with_equality_check(check_equality)
        .run(name_a, f_a, name_b, f_b)
}

/// Time two callables without comparing their results.
pub fn compare_runtimes<T, E, FA, FB>(
    name_a: &str,
    f_a: FA,
    name_b: &str,
    f_b: FB,
) -> Result<ComparisonReport<T>, E>
where
    T: PartialEq + fmt::Debug,
    FA: FnOnce() -> Result<T, E>,
    FB: FnOnce() -> Result<T, E>,
{
    compare(name_a, f_a, name_b, f_b, false)
}
