//! Hour-of-day schedule windows, including midnight-wrapping ranges.

use serde::Deserialize;

/// A half-open hour-of-day window `[start, end)`.
///
/// When `start > end` the window wraps past midnight: hour 23 is inside
/// `{start: 22, end: 6}`, and so is hour 5.
///
/// # Examples
///
/// ```
/// use bess_sim::dispatch::window::TimeWindow;
///
/// let overnight = TimeWindow { start: 22, end: 6 };
/// assert!(overnight.contains(23));
/// assert!(overnight.contains(5));
/// assert!(!overnight.contains(10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeWindow {
    /// First hour inside the window (0-23, inclusive).
    pub start: usize,
    /// First hour past the window (0-23, exclusive).
    pub end: usize,
}

impl TimeWindow {
    /// Returns true when the given hour-of-day falls inside this window.
    pub fn contains(&self, hour: usize) -> bool {
        if self.start <= self.end {
            self.start <= hour && hour < self.end
        } else {
            // Wraps past midnight
            hour >= self.start || hour < self.end
        }
    }
}

/// Returns true when any window in the slice contains the given hour.
pub fn any_window_contains(windows: &[TimeWindow], hour: usize) -> bool {
    windows.iter().any(|w| w.contains(hour))
}
