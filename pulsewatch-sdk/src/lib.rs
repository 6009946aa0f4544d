//! # pulsewatch-sdk
//!
//! Health-monitoring tasks that watch a stream of events and, when polled,
//! write a classified status into a [`DiagnosticReport`].
//!
//! ## Quick Start
//!
//! ```rust
//! use pulsewatch_sdk::{
//!     CompositeTask, DiagnosticTask, DriftMonitor, FrequencyBound, FrequencyMonitor,
//!     FrequencyParams, HeartbeatMonitor, TimestampParams,
//! };
//! use std::sync::Arc;
//! use std::time::SystemTime;
//!
//! // Expect 10-20 events per second from the camera driver.
//! let camera = Arc::new(
//!     FrequencyMonitor::new(FrequencyParams::new(FrequencyBound::range(10.0, 20.0)))
//!         .unwrap()
//!         .named("camera"),
//! );
//! let stamps = Arc::new(DriftMonitor::new(TimestampParams::default()).unwrap());
//!
//! // Producers tick from any thread as events arrive.
//! camera.tick();
//! stamps.tick(SystemTime::now());
//!
//! // The aggregator polls on its own cadence.
//! let node = CompositeTask::new("node")
//!     .with_task(HeartbeatMonitor::new())
//!     .with_task(camera.clone())
//!     .with_task(stamps.clone());
//! let report = node.report();
//! println!("{}: {}", report.level, report.message);
//! ```
//!
//! ## Features
//!
//! - **Windowed rate**: `FrequencyMonitor` averages over the last N report
//!   intervals with O(1) ticks and fixed memory
//! - **Timestamp drift**: `DriftMonitor` flags events stamped too far in the
//!   past or future and keeps lifetime tallies
//! - **Thread-safe**: Tick from any thread while the aggregator runs reports
//! - **Live bounds**: Retune frequency bounds through a `SharedBound`
//! - **Configuration**: Build monitors from TOML files and environment variables

mod clock;
mod config;
mod error;
mod frequency;
mod heartbeat;
mod task;
mod timestamp;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{FrequencySettings, MonitorConfig, TimestampSettings};
pub use error::{MonitorError, Result};
pub use frequency::{
    FrequencyBound, FrequencyMonitor, FrequencyParams, SharedBound, DEFAULT_TOLERANCE,
    DEFAULT_WINDOW_SIZE, MAX_WINDOW_SIZE,
};
pub use heartbeat::HeartbeatMonitor;
pub use task::{CompositeTask, DiagnosticTask, FunctionTask};
pub use timestamp::{
    DriftMonitor, DriftTallies, Timestamp, TimestampParams, DEFAULT_MAX_ACCEPTABLE,
    DEFAULT_MIN_ACCEPTABLE,
};

// Re-export types for convenience
pub use pulsewatch_types::{DiagnosticEntry, DiagnosticReport, Severity};
