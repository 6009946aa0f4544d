//! Severity levels attached to every diagnostic report.

use core::fmt;

/// Outcome level of a diagnostic task.
///
/// Levels are totally ordered from best to worst:
/// `Ok < Warn < Error < Stale`. Aggregators merging several reports keep the
/// worst level seen, see [`Severity::worst`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
#[cfg_attr(feature = "minicbor", derive(minicbor::Encode, minicbor::Decode))]
#[cfg_attr(feature = "minicbor", cbor(index_only))]
pub enum Severity {
    /// Everything is within bounds.
    #[default]
    #[cfg_attr(feature = "minicbor", n(0))]
    Ok,

    /// Degraded, but still producing data.
    #[cfg_attr(feature = "minicbor", n(1))]
    Warn,

    /// Out of bounds.
    #[cfg_attr(feature = "minicbor", n(2))]
    Error,

    /// No data arrived to judge by.
    #[cfg_attr(feature = "minicbor", n(3))]
    Stale,
}

impl Severity {
    /// Returns the worse of two levels.
    pub fn worst(self, other: Severity) -> Severity {
        self.max(other)
    }

    /// Returns true for [`Severity::Ok`].
    pub fn is_ok(&self) -> bool {
        matches!(self, Severity::Ok)
    }

    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Stale => "STALE",
        }
    }

    /// Numeric level, matching the conventional 0..=3 diagnostic encoding.
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
