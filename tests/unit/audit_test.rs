//! Tests for the recent-event log

use runway_scheduler::config::AirfieldConfig;
use runway_scheduler::core::{Airfield, EventLog, FlightAction, FlightKind};

#[test]
fn test_event_log_records_in_order() {
    let mut log = EventLog::new(10);
    log.record(FlightAction::Enqueued, Some(1), None);
    log.record(FlightAction::Dispatched, Some(1), Some(0));

    let events = log.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].action, FlightAction::Enqueued);
    assert_eq!(events[1].runway, Some(0));
    assert!(events[1].sequence > events[0].sequence);
}

#[test]
fn test_event_log_overflow() {
    let mut log = EventLog::new(2);
    for id in 1..=3 {
        log.record(FlightAction::Enqueued, Some(id), None);
    }
    let ids: Vec<_> = log.events().iter().filter_map(|e| e.flight_id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn test_snapshot_carries_recent_events() {
    let airfield = Airfield::new(AirfieldConfig::new().with_event_log_capacity(8)).unwrap();
    let id = airfield
        .try_submit_flight("SAS1", FlightKind::Landing, 100, false)
        .unwrap();
    airfield.mark_emergency(id);
    airfield.toggle_weather();

    let actions: Vec<_> = airfield
        .snapshot()
        .recent_events
        .iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(
        actions,
        vec![
            FlightAction::Enqueued,
            FlightAction::EmergencyMarked,
            FlightAction::WeatherToggled
        ]
    );
}
