//! Liveness task.

use pulsewatch_types::{DiagnosticReport, Severity};

use crate::task::DiagnosticTask;

/// Always reports OK, "Alive".
///
/// Its presence in a published report shows that the aggregator is still
/// invoking tasks, independent of any monitored subsystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeartbeatMonitor;

impl HeartbeatMonitor {
    /// Create a heartbeat task.
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticTask for HeartbeatMonitor {
    fn name(&self) -> &str {
        "Heartbeat"
    }

    fn run(&self, report: &mut DiagnosticReport) {
        report.summary(Severity::Ok, "Alive");
    }
}
