//! # pulsewatch-types
//!
//! Report types shared by pulsewatch health-monitoring tasks and whatever
//! aggregates their output.
//!
//! A task run produces one [`DiagnosticReport`]: a [`Severity`], a
//! summary message, and an ordered list of [`DiagnosticEntry`] key/value
//! observations.
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: JSON/MessagePack/etc. serialization via serde
//! - `minicbor`: Compact binary serialization via CBOR
//! - `all`: Enable all serialization formats
//!
//! ## Example
//!
//! ```rust
//! use pulsewatch_types::{DiagnosticReport, Severity};
//!
//! let mut combined = DiagnosticReport::new("node");
//! combined.merge_summary(Severity::Ok, "Alive");
//! combined.merge_summary(Severity::Error, "Frequency too low.");
//!
//! assert_eq!(combined.level, Severity::Error);
//! assert_eq!(combined.message, "Frequency too low.");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod report;
mod severity;

pub use report::*;
pub use severity::*;
