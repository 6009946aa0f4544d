//! Timestamp drift monitor.
//!
//! Each event carries the time it claims to have been produced. The monitor
//! tracks how far those claims are from the wall clock at observation time,
//! reports the extremes seen since the last run, and keeps lifetime tallies
//! of every interval that contained an anomaly.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use pulsewatch_types::{DiagnosticReport, Severity};
use tracing::{debug, trace, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{MonitorError, Result};
use crate::task::DiagnosticTask;

/// Default earliest acceptable delay, in seconds (one second in the future).
pub const DEFAULT_MIN_ACCEPTABLE: f64 = -1.0;

/// Default latest acceptable delay, in seconds.
pub const DEFAULT_MAX_ACCEPTABLE: f64 = 5.0;

/// An event's self-reported time, in seconds since the UNIX epoch.
///
/// Zero is reserved to mean "no valid timestamp".
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Timestamp(f64);

impl Timestamp {
    /// The invalid-timestamp sentinel.
    pub const ZERO: Timestamp = Timestamp(0.0);

    /// From seconds since the UNIX epoch.
    pub const fn from_secs_f64(secs: f64) -> Self {
        Self(secs)
    }

    /// From nanoseconds since the UNIX epoch.
    pub fn from_nanos(nanos: u64) -> Self {
        Self::from(Duration::from_nanos(nanos))
    }

    /// Seconds since the UNIX epoch.
    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }

    /// True for the invalid-timestamp sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// True unless the stamp is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl From<f64> for Timestamp {
    fn from(secs: f64) -> Self {
        Self(secs)
    }
}

impl From<Duration> for Timestamp {
    fn from(since_epoch: Duration) -> Self {
        Self(since_epoch.as_secs_f64())
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self(after.as_secs_f64()),
            Err(before) => Self(-before.duration().as_secs_f64()),
        }
    }
}

/// Construction parameters for a [`DriftMonitor`].
///
/// Delays are `observation time - event time` in seconds. A negative
/// `min_acceptable` tolerates events stamped slightly in the future.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestampParams {
    /// Earliest acceptable delay.
    pub min_acceptable: f64,
    /// Latest acceptable delay.
    pub max_acceptable: f64,
}

impl TimestampParams {
    /// Parameters with explicit bounds.
    pub fn new(min_acceptable: f64, max_acceptable: f64) -> Self {
        Self {
            min_acceptable,
            max_acceptable,
        }
    }

    /// Check that the bounds are finite and ordered.
    pub fn validate(&self) -> Result<()> {
        let finite = self.min_acceptable.is_finite() && self.max_acceptable.is_finite();
        if finite && self.min_acceptable <= self.max_acceptable {
            Ok(())
        } else {
            Err(MonitorError::InvalidTimestampBounds {
                min: self.min_acceptable,
                max: self.max_acceptable,
            })
        }
    }
}

impl Default for TimestampParams {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ACCEPTABLE, DEFAULT_MAX_ACCEPTABLE)
    }
}

/// Lifetime counts of report intervals that contained each anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriftTallies {
    /// Intervals with a timestamp too far in the future.
    pub early: u64,
    /// Intervals with a timestamp too far in the past.
    pub late: u64,
    /// Intervals with a zero timestamp.
    pub zero: u64,
}

#[derive(Debug, Default)]
struct DriftState {
    tallies: DriftTallies,
    zero_seen: bool,
    min_delta: f64,
    max_delta: f64,
    deltas_valid: bool,
}

impl DriftState {
    fn record(&mut self, delta: f64) {
        if !self.deltas_valid || delta > self.max_delta {
            self.max_delta = delta;
        }
        if !self.deltas_valid || delta < self.min_delta {
            self.min_delta = delta;
        }
        self.deltas_valid = true;
    }

    fn reset_interval(&mut self) {
        self.deltas_valid = false;
        self.min_delta = 0.0;
        self.max_delta = 0.0;
        self.zero_seen = false;
    }
}

/// Monitors the delay between event timestamps and observation time.
///
/// # Example
///
/// ```rust
/// use pulsewatch_sdk::{Clock, DiagnosticTask, DriftMonitor, ManualClock, Severity, TimestampParams};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let clock = Arc::new(ManualClock::new());
/// let monitor = DriftMonitor::with_clock(TimestampParams::default(), clock.clone()).unwrap();
///
/// monitor.tick(clock.system_now() - Duration::from_secs(10));
///
/// let report = monitor.report();
/// assert_eq!(report.level, Severity::Error);
/// assert_eq!(monitor.tallies().late, 1);
/// ```
pub struct DriftMonitor {
    name: String,
    params: TimestampParams,
    clock: Arc<dyn Clock>,
    state: Mutex<DriftState>,
}

impl DriftMonitor {
    /// Build a monitor on the system clock.
    pub fn new(params: TimestampParams) -> Result<Self> {
        Self::with_clock(params, Arc::new(SystemClock))
    }

    /// Build a monitor reading wall time from `clock`.
    pub fn with_clock(params: TimestampParams, clock: Arc<dyn Clock>) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            name: "Timestamp Status".to_string(),
            params,
            clock,
            state: Mutex::new(DriftState::default()),
        })
    }

    /// Set the task name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Record an event stamped at `stamp`.
    ///
    /// A zero stamp is counted as "zero timestamp seen" and does not
    /// contribute to the delay extremes. Non-finite stamps are dropped.
    pub fn tick(&self, stamp: impl Into<Timestamp>) {
        let stamp = stamp.into();
        if !stamp.is_finite() {
            warn!(task = %self.name, stamp = stamp.as_secs_f64(), "dropping non-finite timestamp");
            return;
        }
        let mut state = self.state.lock();

        if stamp.is_zero() {
            state.zero_seen = true;
        } else {
            let now = Timestamp::from(self.clock.system_now());
            state.record(now.as_secs_f64() - stamp.as_secs_f64());
        }
    }

    /// Lifetime anomaly tallies.
    pub fn tallies(&self) -> DriftTallies {
        self.state.lock().tallies
    }

    /// The monitor's parameters.
    pub fn params(&self) -> &TimestampParams {
        &self.params
    }
}

impl DiagnosticTask for DriftMonitor {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, report: &mut DiagnosticReport) {
        let mut state = self.state.lock();
        let params = &self.params;

        report.summary(Severity::Ok, "Timestamps are reasonable.");
        if !state.deltas_valid {
            report.summary(Severity::Warn, "No data since last update.");
        } else {
            if state.min_delta < params.min_acceptable {
                report.summary(Severity::Error, "Timestamps too far in future seen.");
                state.tallies.early += 1;
            }
            if state.max_delta > params.max_acceptable {
                report.summary(Severity::Error, "Timestamps too far in past seen.");
                state.tallies.late += 1;
            }
        }
        if state.zero_seen {
            report.summary(Severity::Error, "Zero timestamp seen.");
            state.tallies.zero += 1;
        }

        if report.level == Severity::Error {
            debug!(
                task = %self.name,
                min_delta = state.min_delta,
                max_delta = state.max_delta,
                zero_seen = state.zero_seen,
                "timestamp anomaly tallied"
            );
        }
        trace!(task = %self.name, tallies = ?state.tallies, "timestamp interval evaluated");

        report.add(
            "Earliest timestamp delay",
            format!("{:.6}", state.min_delta),
        );
        report.add("Latest timestamp delay", format!("{:.6}", state.max_delta));
        report.add(
            "Earliest acceptable timestamp delay",
            format!("{:.6}", params.min_acceptable),
        );
        report.add(
            "Latest acceptable timestamp delay",
            format!("{:.6}", params.max_acceptable),
        );
        report.add("Late diagnostic update count", state.tallies.late);
        report.add("Early diagnostic update count", state.tallies.early);
        report.add("Zero seen diagnostic update count", state.tallies.zero);

        state.reset_interval();
    }
}

impl fmt::Debug for DriftMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriftMonitor")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}
