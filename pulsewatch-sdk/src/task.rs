//! The diagnostic task abstraction and its generic implementations.

use std::fmt;
use std::sync::Arc;

use pulsewatch_types::DiagnosticReport;

/// A unit of health monitoring that can be asked for a status report.
///
/// Implementors keep their own accumulation state behind interior
/// mutability, so `run` takes `&self` and a task can be shared between the
/// threads feeding it events and the aggregator polling it.
pub trait DiagnosticTask: Send + Sync {
    /// Stable name used to label this task's reports.
    fn name(&self) -> &str;

    /// Write the current status into `report`.
    ///
    /// Tasks append entries and set the summary. They do not inspect what
    /// the report already contains.
    fn run(&self, report: &mut DiagnosticReport);

    /// Run into a fresh report named after this task.
    fn report(&self) -> DiagnosticReport {
        let mut report = DiagnosticReport::new(self.name());
        self.run(&mut report);
        report
    }
}

impl<T: DiagnosticTask + ?Sized> DiagnosticTask for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&self, report: &mut DiagnosticReport) {
        (**self).run(report)
    }
}

impl<T: DiagnosticTask + ?Sized> DiagnosticTask for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&self, report: &mut DiagnosticReport) {
        (**self).run(report)
    }
}

type RunFn = dyn Fn(&mut DiagnosticReport) + Send + Sync;

/// A task backed by a closure.
///
/// Use this for custom sampling monitors such as CPU load, where the host
/// owns the sampling and only needs to describe the result.
///
/// # Example
///
/// ```rust
/// use pulsewatch_sdk::{DiagnosticTask, FunctionTask, Severity};
///
/// let cpu = FunctionTask::new("CPU Information", |report| {
///     let load = 42.0;
///     report.add("CPU Load Average", load);
///     report.summary(Severity::Ok, format!("CPU Average {load:.1} percent"));
/// });
///
/// let report = cpu.report();
/// assert_eq!(report.message, "CPU Average 42.0 percent");
/// ```
pub struct FunctionTask {
    name: String,
    run: Box<RunFn>,
}

impl FunctionTask {
    /// Wrap a closure as a named task.
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&mut DiagnosticReport) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }
}

impl DiagnosticTask for FunctionTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, report: &mut DiagnosticReport) {
        (self.run)(report)
    }
}

impl fmt::Debug for FunctionTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTask")
            .field("name", &self.name)
            .finish()
    }
}

/// A task that runs several child tasks into a single report.
///
/// Child entries are appended in order. Child summaries are merged worst-wins
/// with [`DiagnosticReport::merge_summary`].
pub struct CompositeTask {
    name: String,
    tasks: Vec<Box<dyn DiagnosticTask>>,
}

impl CompositeTask {
    /// Create an empty composite.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    /// Add a child task (builder style).
    pub fn with_task(mut self, task: impl DiagnosticTask + 'static) -> Self {
        self.add_task(task);
        self
    }

    /// Add a child task.
    pub fn add_task(&mut self, task: impl DiagnosticTask + 'static) {
        self.tasks.push(Box::new(task));
    }

    /// Number of child tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when there are no child tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl DiagnosticTask for CompositeTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, report: &mut DiagnosticReport) {
        let mut combined = DiagnosticReport::new(self.name.as_str());

        for task in &self.tasks {
            let mut child = DiagnosticReport::new(task.name());
            task.run(&mut child);
            combined.merge_summary(child.level, &child.message);
            report.entries.append(&mut child.entries);
        }

        report.summary(combined.level, combined.message);
    }
}

impl fmt::Debug for CompositeTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.tasks.iter().map(|t| t.name()).collect();
        f.debug_struct("CompositeTask")
            .field("name", &self.name)
            .field("tasks", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsewatch_types::Severity;

    fn fixed(name: &'static str, level: Severity, message: &'static str) -> FunctionTask {
        FunctionTask::new(name, move |report| {
            report.summary(level, message);
            report.add(format!("{name} ran"), true);
        })
    }

    #[test]
    fn function_task_runs_closure() {
        let task = fixed("probe", Severity::Warn, "slow");
        let report = task.report();

        assert_eq!(report.name, "probe");
        assert_eq!(report.level, Severity::Warn);
        assert_eq!(report.message, "slow");
        assert_eq!(report.get("probe ran"), Some("true"));
    }

    #[test]
    fn composite_merges_worst_wins() {
        let composite = CompositeTask::new("combined")
            .with_task(fixed("a", Severity::Ok, "fine"))
            .with_task(fixed("b", Severity::Warn, "slow"))
            .with_task(fixed("c", Severity::Error, "broken"));

        let report = composite.report();
        assert_eq!(report.name, "combined");
        assert_eq!(report.level, Severity::Error);
        assert_eq!(report.message, "slow; broken");
        assert_eq!(report.len(), 3);

        let keys: Vec<&str> = report.entries().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["a ran", "b ran", "c ran"]);
    }

    #[test]
    fn composite_of_oks_joins_messages() {
        let composite = CompositeTask::new("combined")
            .with_task(fixed("a", Severity::Ok, "fine"))
            .with_task(fixed("b", Severity::Ok, "also fine"));

        let report = composite.report();
        assert!(report.level.is_ok());
        assert_eq!(report.message, "fine; also fine");
    }

    #[test]
    fn empty_composite_is_ok() {
        let composite = CompositeTask::new("empty");
        assert!(composite.is_empty());

        let report = composite.report();
        assert!(report.level.is_ok());
        assert!(report.is_empty());
    }

    #[test]
    fn shared_tasks_run_through_arc() {
        let shared = Arc::new(fixed("shared", Severity::Ok, "ok"));
        let composite = CompositeTask::new("combined").with_task(shared.clone());

        assert_eq!(composite.len(), 1);
        assert_eq!(shared.report().message, "ok");
        assert_eq!(composite.report().message, "ok");
    }

    #[test]
    fn debug_lists_child_names() {
        let composite = CompositeTask::new("combined")
            .with_task(fixed("a", Severity::Ok, ""))
            .with_task(fixed("b", Severity::Ok, ""));

        let debug = format!("{:?}", composite);
        assert!(debug.contains("\"a\""));
        assert!(debug.contains("\"b\""));
    }
}
