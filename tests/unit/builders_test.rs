//! Tests for builder modules

use runway_scheduler::builders::{build_airfield, AirfieldBuilder};
use runway_scheduler::config::AirfieldConfig;
use runway_scheduler::core::{FlightKind, SchedulerError, ShutdownMode};

#[test]
fn test_airfield_builder_defaults() {
    let builder = AirfieldBuilder::default();
    assert_eq!(builder.config().queue_capacity, 256);
    assert_eq!(builder.config().runway_count, 2);
    assert_eq!(builder.config().scheduler_count, 1);
}

#[test]
fn test_airfield_builder_from_json() {
    let builder =
        AirfieldBuilder::from_json_str(r#"{ "queue_capacity": 3, "runway_count": 1 }"#).unwrap();
    let airfield = builder.build().unwrap();
    assert_eq!(airfield.config().queue_capacity, 3);
    assert_eq!(airfield.snapshot().runways.len(), 1);
}

#[test]
fn test_airfield_builder_rejects_bad_json() {
    let err = AirfieldBuilder::from_json_str(r#"{ "queue_capacity": 0 }"#).unwrap_err();
    assert!(matches!(err, SchedulerError::Config(_)));
}

#[test]
fn test_start_requires_runtime() {
    let err = AirfieldBuilder::default().start().unwrap_err();
    assert!(matches!(err, SchedulerError::Setup(_)));
}

#[tokio::test(start_paused = true)]
async fn test_build_airfield_starts_engines() {
    let cfg = AirfieldConfig::new()
        .with_queue_capacity(4)
        .with_runway_count(1)
        .with_scheduler_count(2);
    let (airfield, engines) = build_airfield(&cfg).unwrap();
    assert_eq!(engines.engine_count(), 2);

    airfield
        .submit_flight("KLM7", FlightKind::Takeoff, 50, false)
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let stats = engines.shutdown(ShutdownMode::Drain).await;
    assert_eq!(stats.dispatched, 1);
    assert_eq!(airfield.snapshot().metrics.total_assigned, 1);
}
