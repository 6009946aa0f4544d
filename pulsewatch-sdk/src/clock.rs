//! Time sources used by the monitors.

use std::fmt;
use std::time::{Duration, Instant, SystemTime};

use parking_lot::Mutex;

/// A source of monotonic and wall-clock readings.
///
/// The rate monitor measures windows with [`Clock::now`]; the drift monitor
/// compares event timestamps against [`Clock::system_now`].
pub trait Clock: Send + Sync {
    /// Monotonic reading.
    fn now(&self) -> Instant;

    /// Wall-clock reading.
    fn system_now(&self) -> SystemTime;
}

/// The process clocks: `Instant::now()` and `SystemTime::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn system_now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to.
///
/// Both readings start from the moment of construction and advance together.
///
/// # Example
///
/// ```rust
/// use pulsewatch_sdk::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_secs(2));
/// assert_eq!(clock.now() - start, Duration::from_secs(2));
/// ```
pub struct ManualClock {
    base: Instant,
    system_base: SystemTime,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Create a clock anchored at the current instant and wall time.
    pub fn new() -> Self {
        Self::starting_at(SystemTime::now())
    }

    /// Create a clock whose wall-clock reading starts at `system_time`.
    pub fn starting_at(system_time: SystemTime) -> Self {
        Self {
            base: Instant::now(),
            system_base: system_time,
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move both readings forward.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    /// Total time advanced since construction.
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }

    fn system_now(&self) -> SystemTime {
        self.system_base + *self.offset.lock()
    }
}

impl fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualClock")
            .field("elapsed", &self.elapsed())
            .finish()
    }
}
