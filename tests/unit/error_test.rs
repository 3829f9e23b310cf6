//! Tests for error types

use runway_scheduler::core::SchedulerError;

#[test]
fn test_queue_full_error() {
    let err = SchedulerError::QueueFull { capacity: 256 };
    assert_eq!(format!("{}", err), "queue full: capacity 256");
}

#[test]
fn test_closed_error() {
    assert_eq!(SchedulerError::Closed.to_string(), "airfield closed");
}

#[test]
fn test_config_error() {
    let err = SchedulerError::Config("runway_count must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "config invalid: runway_count must be greater than 0"
    );
}

#[test]
fn test_schedule_error() {
    let err = SchedulerError::Schedule {
        line: 4,
        reason: "duration `x` is not a number".to_string(),
    };
    assert_eq!(err.to_string(), "schedule line 4: duration `x` is not a number");
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: SchedulerError = io.into();
    assert!(matches!(err, SchedulerError::Io(_)));
    assert!(err.to_string().starts_with("io error:"));
}
