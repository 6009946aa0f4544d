//! Sliding-window event rate monitor.
//!
//! The window is a ring of `(instant, cumulative count)` samples, one per
//! report interval. Each `run()` compares the current count and time against
//! the oldest sample in the ring, so ticks cost O(1) and memory does not grow
//! with the event rate.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use pulsewatch_types::{DiagnosticReport, Severity};
use tracing::{debug, trace, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{MonitorError, Result};
use crate::task::DiagnosticTask;

/// Default fraction by which the bounds are widened.
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// Default number of report intervals in the window.
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Largest accepted window size.
pub const MAX_WINDOW_SIZE: usize = 1 << 16;

/// Acceptable event rate, in events per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyBound {
    /// Minimum required rate.
    pub min: f64,
    /// Maximum allowed rate, if any.
    pub max: Option<f64>,
}

impl FrequencyBound {
    /// A bound with only a minimum.
    pub fn at_least(min: f64) -> Self {
        Self { min, max: None }
    }

    /// A bound with a minimum and a maximum.
    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// A bound where min and max are the same target rate.
    pub fn exactly(target: f64) -> Self {
        Self::range(target, target)
    }

    /// Check that the bound is finite, non-negative and not inverted.
    pub fn validate(&self) -> Result<()> {
        let min_ok = self.min.is_finite() && self.min >= 0.0;
        let max_ok = self
            .max
            .map_or(true, |max| max.is_finite() && max >= self.min);

        if min_ok && max_ok {
            Ok(())
        } else {
            Err(MonitorError::InvalidFrequencyBound {
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// A frequency bound that can be replaced while monitors are running.
///
/// Clones share the same cell, so a handle kept by the host can retune every
/// monitor built from it.
#[derive(Debug, Clone)]
pub struct SharedBound(Arc<RwLock<FrequencyBound>>);

impl SharedBound {
    /// Wrap a bound in a shared cell.
    pub fn new(bound: FrequencyBound) -> Self {
        Self(Arc::new(RwLock::new(bound)))
    }

    /// Current bound.
    pub fn get(&self) -> FrequencyBound {
        *self.0.read()
    }

    /// Replace the bound. Invalid bounds are rejected and the old one kept.
    pub fn set(&self, bound: FrequencyBound) -> Result<()> {
        bound.validate()?;
        *self.0.write() = bound;
        debug!(min = bound.min, max = ?bound.max, "frequency bound updated");
        Ok(())
    }
}

impl From<FrequencyBound> for SharedBound {
    fn from(bound: FrequencyBound) -> Self {
        Self::new(bound)
    }
}

/// Construction parameters for a [`FrequencyMonitor`].
///
/// Acceptable rates run from `min * (1 - tolerance)` to
/// `max * (1 + tolerance)`.
#[derive(Debug, Clone)]
pub struct FrequencyParams {
    /// Rate bounds, shared so they can be updated live.
    pub bound: SharedBound,
    /// Fraction by which the bounds are widened.
    pub tolerance: f64,
    /// Number of report intervals the rate is averaged over.
    pub window_size: usize,
}

impl FrequencyParams {
    /// Parameters with default tolerance and window size.
    pub fn new(bound: impl Into<SharedBound>) -> Self {
        Self {
            bound: bound.into(),
            tolerance: DEFAULT_TOLERANCE,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }

    /// Set the tolerance.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the window size.
    pub fn window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Check every parameter.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_WINDOW_SIZE).contains(&self.window_size) {
            return Err(MonitorError::InvalidWindowSize(self.window_size));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(MonitorError::InvalidTolerance(self.tolerance));
        }
        self.bound.get().validate()
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    at: Instant,
    count: u64,
}

#[derive(Debug)]
struct WindowState {
    count: u64,
    ring: Vec<Sample>,
    cursor: usize,
}

impl WindowState {
    fn seeded(now: Instant, window_size: usize) -> Self {
        Self {
            count: 0,
            ring: vec![Sample { at: now, count: 0 }; window_size],
            cursor: 0,
        }
    }

    /// Compare against the oldest sample, then replace it with `now`.
    fn rotate(&mut self, now: Instant) -> Reading {
        let oldest = self.ring[self.cursor];
        let events = self.count.wrapping_sub(oldest.count);
        let window = now.saturating_duration_since(oldest.at);

        self.ring[self.cursor] = Sample {
            at: now,
            count: self.count,
        };
        self.cursor = (self.cursor + 1) % self.ring.len();

        Reading {
            events,
            total: self.count,
            window,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Reading {
    events: u64,
    total: u64,
    window: Duration,
}

impl Reading {
    /// Events per second, or `None` when the window has no duration.
    fn rate(&self) -> Option<f64> {
        let secs = self.window.as_secs_f64();
        (secs > 0.0).then(|| self.events as f64 / secs)
    }
}

fn classify(
    reading: &Reading,
    rate: Option<f64>,
    bound: &FrequencyBound,
    tolerance: f64,
) -> (Severity, &'static str) {
    if reading.events == 0 {
        return (Severity::Stale, "No events recorded.");
    }

    let Some(rate) = rate else {
        return (Severity::Stale, "No data: window has zero duration.");
    };

    if rate < bound.min * (1.0 - tolerance) {
        (Severity::Error, "Frequency too low.")
    } else if bound.max.is_some_and(|max| rate > max * (1.0 + tolerance)) {
        (Severity::Error, "Frequency too high.")
    } else {
        (Severity::Ok, "Desired frequency met.")
    }
}

/// Monitors how often [`tick`](FrequencyMonitor::tick) is called.
///
/// Producers call `tick()` from any thread. The aggregator calls `run()`
/// once per report interval; each call measures the rate over the last
/// `window_size` intervals and classifies it against the bounds.
///
/// # Example
///
/// ```rust
/// use pulsewatch_sdk::{
///     DiagnosticTask, FrequencyBound, FrequencyMonitor, FrequencyParams, ManualClock, Severity,
/// };
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let clock = Arc::new(ManualClock::new());
/// let params = FrequencyParams::new(FrequencyBound::range(10.0, 20.0)).tolerance(0.0);
/// let monitor = FrequencyMonitor::with_clock(params, clock.clone()).unwrap();
///
/// for _ in 0..15 {
///     monitor.tick();
/// }
/// clock.advance(Duration::from_secs(1));
///
/// let report = monitor.report();
/// assert_eq!(report.level, Severity::Ok);
/// assert_eq!(report.get("Actual frequency (Hz)"), Some("15.000000"));
/// ```
pub struct FrequencyMonitor {
    name: String,
    params: FrequencyParams,
    clock: Arc<dyn Clock>,
    state: Mutex<WindowState>,
}

impl FrequencyMonitor {
    /// Build a monitor on the system clock.
    pub fn new(params: FrequencyParams) -> Result<Self> {
        Self::with_clock(params, Arc::new(SystemClock))
    }

    /// Build a monitor reading time from `clock`.
    pub fn with_clock(params: FrequencyParams, clock: Arc<dyn Clock>) -> Result<Self> {
        params.validate()?;
        let state = WindowState::seeded(clock.now(), params.window_size);

        Ok(Self {
            name: "Frequency Status".to_string(),
            params,
            clock,
            state: Mutex::new(state),
        })
    }

    /// Set the task name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Record one event.
    pub fn tick(&self) {
        let mut state = self.state.lock();
        state.count = state.count.wrapping_add(1);
    }

    /// Reset the event count and reseed the window at the current instant.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        *state = WindowState::seeded(self.clock.now(), self.params.window_size);
        debug!(task = %self.name, "frequency window cleared");
    }

    /// Total events since construction or the last [`clear`](Self::clear).
    pub fn events_since_startup(&self) -> u64 {
        self.state.lock().count
    }

    /// The monitor's parameters.
    pub fn params(&self) -> &FrequencyParams {
        &self.params
    }
}

impl DiagnosticTask for FrequencyMonitor {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, report: &mut DiagnosticReport) {
        let mut state = self.state.lock();
        let reading = state.rotate(self.clock.now());

        let bound = self.params.bound.get();
        let tolerance = self.params.tolerance;
        let rate = reading.rate();
        let (level, message) = classify(&reading, rate, &bound, tolerance);

        if rate.is_none() && reading.events > 0 {
            warn!(task = %self.name, events = reading.events, "rate window has zero duration");
        }
        let rate = rate.unwrap_or(0.0);
        trace!(
            task = %self.name,
            events = reading.events,
            window_s = reading.window.as_secs_f64(),
            rate,
            severity = %level,
            "frequency window evaluated"
        );

        report.summary(level, message);
        report.add("Events in window", reading.events);
        report.add("Events since startup", reading.total);
        report.add(
            "Duration of window (s)",
            format!("{:.6}", reading.window.as_secs_f64()),
        );
        report.add("Actual frequency (Hz)", format!("{rate:.6}"));
        if bound.max == Some(bound.min) {
            report.add("Target frequency (Hz)", format!("{:.6}", bound.min));
        }
        if bound.min > 0.0 {
            report.add(
                "Minimum acceptable frequency (Hz)",
                format!("{:.6}", bound.min * (1.0 - tolerance)),
            );
        }
        if let Some(max) = bound.max {
            report.add(
                "Maximum acceptable frequency (Hz)",
                format!("{:.6}", max * (1.0 + tolerance)),
            );
        }
    }
}

impl fmt::Debug for FrequencyMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrequencyMonitor")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}
