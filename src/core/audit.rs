//! Bounded in-memory log of recent scheduling events.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::FlightId;
use crate::util::clock::now_ms;

/// Action recorded in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightAction {
    /// Flight entered the queue.
    Enqueued,
    /// Queued flight flagged as emergency.
    EmergencyMarked,
    /// Severe weather switched on or off.
    WeatherToggled,
    /// Flight left the queue and got a runway.
    Dispatched,
    /// Worker finished and freed its runway.
    Released,
    /// Worker was cancelled and freed its runway.
    Cancelled,
    /// Worker found another occupant in its slot.
    OwnershipMismatch,
    /// Assignment undone; flight back at the front of the queue.
    RolledBack,
    /// Assignment undone and the flight could not be queued again.
    Dropped,
}

impl fmt::Display for FlightAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Enqueued => "enqueued",
            Self::EmergencyMarked => "emergency",
            Self::WeatherToggled => "weather",
            Self::Dispatched => "dispatched",
            Self::Released => "released",
            Self::Cancelled => "cancelled",
            Self::OwnershipMismatch => "ownership-mismatch",
            Self::RolledBack => "rolled-back",
            Self::Dropped => "dropped",
        };
        f.write_str(name)
    }
}

/// One entry of the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightEvent {
    /// Position in the overall event stream.
    pub sequence: u64,
    /// Related flight, if the event concerns one.
    pub flight_id: Option<FlightId>,
    /// What happened.
    pub action: FlightAction,
    /// Runway index involved, if any.
    pub runway: Option<usize>,
    /// Timestamp in milliseconds since epoch.
    pub at_ms: u128,
}

impl fmt::Display for FlightEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.sequence, self.action)?;
        if let Some(id) = self.flight_id {
            write!(f, " flight={id}")?;
        }
        if let Some(runway) = self.runway {
            write!(f, " rwy={}", runway + 1)?;
        }
        Ok(())
    }
}

/// Ring of the most recent events; the oldest is evicted when full.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<FlightEvent>,
    max_events: usize,
    next_sequence: u64,
}

impl EventLog {
    /// Create a log holding at most `max_events` entries.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
            next_sequence: 1,
        }
    }

    /// Append an event.
    pub fn record(&mut self, action: FlightAction, flight_id: Option<FlightId>, runway: Option<usize>) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(FlightEvent {
            sequence: self.next_sequence,
            flight_id,
            action,
            runway,
            at_ms: now_ms(),
        });
        self.next_sequence += 1;
    }

    /// Copy of the retained events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<FlightEvent> {
        self.events.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_evicts_oldest() {
        let mut log = EventLog::new(2);
        log.record(FlightAction::Enqueued, Some(1), None);
        log.record(FlightAction::Enqueued, Some(2), None);
        log.record(FlightAction::Dispatched, Some(1), Some(0));

        let events = log.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].flight_id, Some(2));
        assert_eq!(events[1].sequence, 3);
        assert_eq!(events[1].to_string(), "#3 dispatched flight=1 rwy=1");
    }

    #[test]
    fn test_zero_capacity_log_keeps_nothing() {
        let mut log = EventLog::new(0);
        log.record(FlightAction::WeatherToggled, None, None);
        assert!(log.events().is_empty());
    }
}
