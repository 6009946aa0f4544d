//! Example: monitoring a simulated sensor.
//!
//! A producer thread publishes readings at roughly 15 Hz, each carrying its
//! capture timestamp. Every few seconds it stalls. A tokio interval polls the
//! monitors once a second and prints the combined report as JSON.
//!
//! Run with: cargo run -p pulsewatch-sdk --example sensor_monitor

use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};

use pulsewatch_sdk::{
    CompositeTask, DiagnosticTask, DriftMonitor, FrequencyBound, FrequencyMonitor,
    FrequencyParams, FunctionTask, HeartbeatMonitor, Severity, TimestampParams,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let rate = Arc::new(
        FrequencyMonitor::new(
            FrequencyParams::new(FrequencyBound::range(10.0, 20.0))
                .tolerance(0.1)
                .window_size(3),
        )?
        .named("sensor rate"),
    );
    let stamps = Arc::new(DriftMonitor::new(TimestampParams::new(-0.1, 0.5))?.named("sensor stamps"));

    // Simulated sensor: 15 Hz, with a two-second stall every ten seconds.
    {
        let rate = rate.clone();
        let stamps = stamps.clone();
        thread::spawn(move || {
            for i in 0u64.. {
                if i % 150 == 149 {
                    thread::sleep(Duration::from_secs(2));
                }
                let captured = SystemTime::now() - Duration::from_millis(20);
                rate.tick();
                stamps.tick(captured);
                thread::sleep(Duration::from_millis(1000 / 15));
            }
        });
    }

    let uptime_start = std::time::Instant::now();
    let uptime = FunctionTask::new("uptime", move |report| {
        let secs = uptime_start.elapsed().as_secs();
        report.add("Uptime (s)", secs);
        report.summary(Severity::Ok, format!("Up {secs}s"));
    });

    let node = CompositeTask::new("sensor node")
        .with_task(HeartbeatMonitor::new())
        .with_task(uptime)
        .with_task(rate.clone())
        .with_task(stamps.clone());

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    for _ in 0..15 {
        interval.tick().await;
        let report = node.report();
        println!("{}", serde_json::to_string(&report)?);
    }

    println!("timestamp tallies: {:?}", stamps.tallies());
    Ok(())
}
