//! Diagnostic report - the output of one task invocation.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Display;

use crate::Severity;

/// A single named observation inside a report.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "minicbor", derive(minicbor::Encode, minicbor::Decode))]
pub struct DiagnosticEntry {
    /// Human-readable key, e.g. `"Events in window"`.
    #[cfg_attr(feature = "minicbor", n(0))]
    pub key: String,

    /// Formatted value.
    #[cfg_attr(feature = "minicbor", n(1))]
    pub value: String,
}

impl DiagnosticEntry {
    /// Create an entry from anything displayable.
    pub fn new(key: impl Into<String>, value: impl Display) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
        }
    }
}

/// The accumulated result of running a diagnostic task.
///
/// A report is built fresh for every invocation. Tasks only ever append
/// entries and set the summary; they never read what was there before.
///
/// # Example
///
/// ```rust
/// use pulsewatch_types::{DiagnosticReport, Severity};
///
/// let mut report = DiagnosticReport::new("camera");
/// report.summary(Severity::Ok, "Desired frequency met.");
/// report.add("Events in window", 150);
/// report.add("Actual frequency (Hz)", format!("{:.6}", 15.0));
///
/// assert_eq!(report.get("Events in window"), Some("150"));
/// assert!(report.level.is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "minicbor", derive(minicbor::Encode, minicbor::Decode))]
pub struct DiagnosticReport {
    /// Name of the task that produced this report.
    #[cfg_attr(feature = "minicbor", n(0))]
    pub name: String,

    /// Overall level.
    #[cfg_attr(feature = "minicbor", n(1))]
    pub level: Severity,

    /// Human-readable summary of the level.
    #[cfg_attr(feature = "minicbor", n(2))]
    pub message: String,

    /// Key/value observations in insertion order.
    #[cfg_attr(feature = "serde", serde(default))]
    #[cfg_attr(feature = "minicbor", n(3))]
    pub entries: Vec<DiagnosticEntry>,
}

impl DiagnosticReport {
    /// Create an empty OK report for the named task.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Overwrite the level and message.
    pub fn summary(&mut self, level: Severity, message: impl Into<String>) {
        self.level = level;
        self.message = message.into();
    }

    /// Merge a level and message into the current summary, worst wins.
    ///
    /// When both levels are OK, or both are non-OK, the messages are joined
    /// with `"; "`. Otherwise the message of the worse level is kept.
    pub fn merge_summary(&mut self, level: Severity, message: &str) {
        if level.is_ok() == self.level.is_ok() {
            if !message.is_empty() {
                if !self.message.is_empty() {
                    self.message.push_str("; ");
                }
                self.message.push_str(message);
            }
        } else if level > self.level {
            self.message = message.to_string();
        }

        self.level = self.level.worst(level);
    }

    /// Reset to OK with an empty message. Entries are kept.
    pub fn clear_summary(&mut self) {
        self.summary(Severity::Ok, "");
    }

    /// Append a key/value entry.
    pub fn add(&mut self, key: impl Into<String>, value: impl Display) {
        self.entries.push(DiagnosticEntry::new(key, value));
    }

    /// Look up the first entry with the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Iterate over entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &DiagnosticEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries have been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
