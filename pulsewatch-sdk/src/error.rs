//! Error types for monitor construction and configuration.

use thiserror::Error;

/// Errors raised while building monitors.
///
/// Running a monitor never fails; problems with the observed events are
/// reported as a [`Severity`](crate::Severity) in the report instead.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The rate window must hold between 1 and `MAX_WINDOW_SIZE` report intervals.
    #[error("window size must be between 1 and {max}, got {0}", max = crate::MAX_WINDOW_SIZE)]
    InvalidWindowSize(usize),

    /// Tolerance must be a finite, non-negative fraction.
    #[error("tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),

    /// Frequency bounds are not finite, negative, or inverted.
    #[error("invalid frequency bound: min {min}, max {max:?}")]
    InvalidFrequencyBound {
        /// Configured minimum rate.
        min: f64,
        /// Configured maximum rate.
        max: Option<f64>,
    },

    /// Acceptable timestamp delays are not finite or inverted.
    #[error("invalid timestamp bounds: min_acceptable {min}, max_acceptable {max}")]
    InvalidTimestampBounds {
        /// Configured minimum acceptable delay (seconds).
        min: f64,
        /// Configured maximum acceptable delay (seconds).
        max: f64,
    },

    /// No monitor with this name is configured.
    #[error("no monitor named '{0}' in configuration")]
    UnknownMonitor(String),

    /// Configuration sources could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
}

/// Result alias for fallible monitor construction.
pub type Result<T> = std::result::Result<T, MonitorError>;
