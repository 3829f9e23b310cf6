//! Tests for the submission API and schedule ingestion

use std::time::Duration;

use runway_scheduler::config::AirfieldConfig;
use runway_scheduler::core::{Airfield, FlightKind, SchedulerError};
use runway_scheduler::runtime::{
    ingest, load_schedule, parse_schedule, status, submit, try_submit, FlightSubmission,
};

fn airfield(capacity: usize) -> Airfield {
    Airfield::new(
        AirfieldConfig::new()
            .with_queue_capacity(capacity)
            .with_default_duration_ms(750),
    )
    .unwrap()
}

#[tokio::test]
async fn test_submit_applies_default_duration() {
    let airfield = airfield(4);
    submit(&airfield, &FlightSubmission::new("SAS1", FlightKind::Landing))
        .await
        .unwrap();
    submit(
        &airfield,
        &FlightSubmission::new("SAS2", FlightKind::Takeoff)
            .with_duration_ms(300)
            .with_emergency(true),
    )
    .await
    .unwrap();

    let snap = status(&airfield);
    assert_eq!(snap.queue[0].occupancy_duration_ms, 750);
    assert_eq!(snap.queue[1].occupancy_duration_ms, 300);
    assert!(snap.queue[1].emergency);
}

#[test]
fn test_try_submit_reports_queue_full() {
    let airfield = airfield(1);
    let sub = FlightSubmission::new("A", FlightKind::Landing);
    try_submit(&airfield, &sub).unwrap();
    let err = try_submit(&airfield, &sub).unwrap_err();
    assert!(matches!(err, SchedulerError::QueueFull { capacity: 1 }));
}

#[test]
fn test_status_report_lists_queue() {
    let airfield = airfield(4);
    try_submit(
        &airfield,
        &FlightSubmission::new("NAX42", FlightKind::Landing).with_emergency(true),
    )
    .unwrap();
    let report = status(&airfield).to_string();
    assert!(report.starts_with("=== STATUS ==="));
    assert!(report.contains("Queue: 1/4"));
    assert!(report.contains("NAX42"));
    assert!(report.contains("LANDING"));
    assert!(report.contains("[EMERGENCY]"));
    assert!(report.contains("Runway 2: FREE"));
}

#[tokio::test(start_paused = true)]
async fn test_ingest_submits_in_order() {
    let airfield = airfield(8);
    let subs = parse_schedule("A land 100 0\nB takeoff 200 1\nC tkof 0 0\n").unwrap();

    let started = tokio::time::Instant::now();
    let ids = ingest(&airfield, &subs, Duration::from_millis(100)).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(300));

    assert_eq!(ids, vec![1, 2, 3]);
    let snap = status(&airfield);
    let labels: Vec<_> = snap.queue.iter().map(|f| f.label.as_str()).collect();
    assert_eq!(labels, vec!["A", "B", "C"]);
    assert_eq!(snap.queue[2].occupancy_duration_ms, 750);
}

#[tokio::test]
async fn test_ingest_stops_when_closed() {
    let airfield = airfield(8);
    airfield.close();
    let subs = parse_schedule("A land 100 0").unwrap();
    let err = ingest(&airfield, &subs, Duration::ZERO).await.unwrap_err();
    assert!(matches!(err, SchedulerError::Closed));
}

#[test]
fn test_load_schedule_from_file() {
    let path = std::env::temp_dir().join(format!("runway_schedule_{}.txt", std::process::id()));
    std::fs::write(&path, "# flights\nSAS9 landing 1200 1\nOSL2 take 400 0\n").unwrap();

    let subs = load_schedule(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(subs.len(), 2);
    assert_eq!(subs[0].kind, FlightKind::Landing);
    assert!(subs[0].emergency);
    assert_eq!(subs[1].duration_ms, Some(400));
}

#[test]
fn test_load_schedule_missing_file() {
    let err = load_schedule("/definitely/not/here.txt").unwrap_err();
    assert!(err.to_string().contains("reading schedule"));
}
