//! Tests for configuration validation

use runway_scheduler::config::{AirfieldConfig, DEFAULT_DURATION_MS};

#[test]
fn test_airfield_config_validation() {
    let valid = AirfieldConfig::new()
        .with_queue_capacity(3)
        .with_runway_count(1)
        .with_scheduler_count(2);
    assert!(valid.validate().is_ok());
}

#[test]
fn test_airfield_config_invalid_runways() {
    let invalid = AirfieldConfig::new().with_runway_count(0);
    let err = invalid.validate().unwrap_err();
    assert!(err.contains("runway_count"));
}

#[test]
fn test_event_log_may_be_disabled() {
    assert!(AirfieldConfig::new().with_event_log_capacity(0).validate().is_ok());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "queue_capacity": 8,
        "runway_count": 3,
        "scheduler_count": 2,
        "default_duration_ms": 500
    }"#;
    let cfg = AirfieldConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.queue_capacity, 8);
    assert_eq!(cfg.runway_count, 3);
    assert_eq!(cfg.scheduler_count, 2);
    assert_eq!(cfg.default_duration_ms, 500);
    assert_eq!(cfg.event_log_capacity, AirfieldConfig::default().event_log_capacity);
}

#[test]
fn test_config_json_roundtrip_preserves_defaults() {
    let json = serde_json::to_string(&AirfieldConfig::default()).unwrap();
    let cfg = AirfieldConfig::from_json_str(&json).unwrap();
    assert_eq!(cfg.default_duration_ms, DEFAULT_DURATION_MS);
}
