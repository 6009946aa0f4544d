use std::sync::Arc;
use std::time::Duration;

use pulsewatch_sdk::{
    Clock, CompositeTask, DiagnosticReport, DiagnosticTask, DriftMonitor, FrequencyBound,
    FrequencyMonitor, FrequencyParams, HeartbeatMonitor, ManualClock, Severity, TimestampParams,
};

fn rate_monitor(clock: &Arc<ManualClock>) -> FrequencyMonitor {
    let params = FrequencyParams::new(FrequencyBound::range(10.0, 20.0))
        .tolerance(0.0)
        .window_size(5);
    FrequencyMonitor::with_clock(params, clock.clone()).unwrap()
}

fn drift_monitor(clock: &Arc<ManualClock>) -> DriftMonitor {
    DriftMonitor::with_clock(TimestampParams::new(-1.0, 5.0), clock.clone()).unwrap()
}

fn value<T: std::str::FromStr>(report: &DiagnosticReport, key: &str) -> T
where
    T::Err: std::fmt::Debug,
{
    report.get(key).unwrap().parse().unwrap()
}

#[test]
fn steady_fifteen_hertz_is_ok_for_every_report() {
    let clock = Arc::new(ManualClock::new());
    let monitor = rate_monitor(&clock);

    for _ in 0..5 {
        for _ in 0..15 {
            monitor.tick();
            clock.advance(Duration::from_millis(1000 / 15));
        }
        // Land exactly on the next whole second.
        clock.advance(Duration::from_secs(1) - Duration::from_millis(15 * (1000 / 15)));

        let report = monitor.report();
        assert_eq!(report.level, Severity::Ok);
        let rate: f64 = value(&report, "Actual frequency (Hz)");
        assert!((rate - 15.0).abs() < 1e-6, "rate was {rate}");
    }
}

#[test]
fn report_without_ticks_is_stale() {
    let clock = Arc::new(ManualClock::new());
    let monitor = rate_monitor(&clock);

    clock.advance(Duration::from_secs(1));
    let report = monitor.report();

    assert_eq!(report.level, Severity::Stale);
    assert_eq!(report.message, "No events recorded.");
    assert_eq!(value::<u64>(&report, "Events in window"), 0);
}

#[test]
fn rate_converges_over_a_full_window() {
    let clock = Arc::new(ManualClock::new());
    let params = FrequencyParams::new(FrequencyBound::at_least(0.0)).window_size(4);
    let monitor = FrequencyMonitor::with_clock(params, clock.clone()).unwrap();

    let mut history = Vec::new();
    for interval in 0..12u64 {
        let n = 20 + interval;
        for _ in 0..n {
            monitor.tick();
        }
        history.push(n);
        clock.advance(Duration::from_secs(1));

        let report = monitor.report();
        if history.len() > 4 {
            let expected: u64 = history[history.len() - 4..].iter().sum();
            assert_eq!(value::<u64>(&report, "Events in window"), expected);

            let rate: f64 = value(&report, "Actual frequency (Hz)");
            assert!((rate - expected as f64 / 4.0).abs() < 1e-6);
        }
    }
}

#[test]
fn stamp_ten_seconds_old_is_late() {
    let clock = Arc::new(ManualClock::new());
    let monitor = drift_monitor(&clock);

    monitor.tick(clock.system_now() - Duration::from_secs(10));
    let report = monitor.report();

    assert_eq!(report.level, Severity::Error);
    assert!(report.message.starts_with("Timestamps too far in past"));
    assert_eq!(monitor.tallies().late, 1);
}

#[test]
fn zero_stamp_alone_reports_zero_seen() {
    let clock = Arc::new(ManualClock::new());
    let monitor = drift_monitor(&clock);

    monitor.tick(0.0);
    let report = monitor.report();

    assert_eq!(report.level, Severity::Error);
    assert_eq!(report.message, "Zero timestamp seen.");
    assert_eq!(monitor.tallies().zero, 1);
    assert_eq!(value::<f64>(&report, "Earliest timestamp delay"), 0.0);
    assert_eq!(value::<f64>(&report, "Latest timestamp delay"), 0.0);
}

#[test]
fn drift_second_run_without_ticks_has_no_data() {
    let clock = Arc::new(ManualClock::new());
    let monitor = drift_monitor(&clock);

    monitor.tick(clock.system_now() - Duration::from_secs(10));
    monitor.report();

    let report = monitor.report();
    assert_eq!(report.level, Severity::Warn);
    assert_eq!(report.message, "No data since last update.");
    // The earlier anomaly is still on record.
    assert_eq!(value::<u64>(&report, "Late diagnostic update count"), 1);
}

#[test]
fn composite_node_report_takes_worst_level() {
    let clock = Arc::new(ManualClock::new());
    let camera = Arc::new(rate_monitor(&clock).named("camera"));
    let stamps = Arc::new(drift_monitor(&clock).named("stamps"));

    let node = CompositeTask::new("node")
        .with_task(HeartbeatMonitor::new())
        .with_task(camera.clone())
        .with_task(stamps.clone());

    for _ in 0..15 {
        camera.tick();
    }
    stamps.tick(clock.system_now());
    clock.advance(Duration::from_secs(1));

    let healthy = node.report();
    assert_eq!(healthy.level, Severity::Ok);
    assert_eq!(
        healthy.message,
        "Alive; Desired frequency met.; Timestamps are reasonable."
    );

    clock.advance(Duration::from_secs(1));
    let quiet = node.report();
    assert_eq!(quiet.level, Severity::Stale);
    assert_eq!(
        quiet.message,
        "No events recorded.; No data since last update."
    );
}
