//! Shared state store: queue, runway table, weather flag and metrics.
//!
//! Nothing here blocks or waits. Every method expects the caller to hold the
//! airfield's state lock; the synchronization protocol lives in
//! [`crate::core::permits`] and the ordering rules in [`crate::core::engine`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::audit::{EventLog, FlightAction, FlightEvent};
use crate::core::runway::{LeaseToken, Metrics, Occupant, ReleaseOutcome, RunwayTable};
use crate::core::{FlightId, FlightKind, FlightQueue, FlightRequest, SchedulerError};

/// All mutable scheduler state, guarded as one unit.
#[derive(Debug, Clone)]
pub struct AirfieldState {
    queue: FlightQueue,
    runways: RunwayTable,
    severe_weather: bool,
    metrics: Metrics,
    next_id: FlightId,
    next_lease: u64,
    events: EventLog,
}

impl AirfieldState {
    /// Fresh state: empty queue, all runways free, weather normal.
    #[must_use]
    pub fn new(queue_capacity: usize, runway_count: usize, event_log_capacity: usize) -> Self {
        Self {
            queue: FlightQueue::new(queue_capacity),
            runways: RunwayTable::new(runway_count),
            severe_weather: false,
            metrics: Metrics::default(),
            next_id: 1,
            next_lease: 1,
            events: EventLog::new(event_log_capacity),
        }
    }

    /// Append a new flight with a fresh id. The caller must hold a free-capacity unit.
    ///
    /// # Errors
    ///
    /// Propagates `InvalidFlight` for a zero duration and `QueueFull` if the
    /// capacity reservation was skipped.
    pub fn enqueue(
        &mut self,
        label: &str,
        kind: FlightKind,
        duration_ms: u64,
        emergency: bool,
    ) -> Result<FlightId, SchedulerError> {
        let id = self.next_id;
        let flight = FlightRequest::new(id, label, kind, duration_ms, emergency)?;
        self.queue.enqueue(flight)?;
        self.next_id += 1;
        self.events.record(FlightAction::Enqueued, Some(id), None);
        Ok(id)
    }

    /// Position of the next flight the weather policy allows.
    #[must_use]
    pub fn find_eligible(&self) -> Option<usize> {
        self.queue.find_eligible(self.severe_weather)
    }

    /// Remove the flight at a logical queue position.
    pub fn remove_at(&mut self, position: usize) -> Option<FlightRequest> {
        self.queue.remove_at(position)
    }

    /// Pick and remove the eligible flight in one step.
    pub fn take_eligible(&mut self) -> Option<FlightRequest> {
        let position = self.find_eligible()?;
        self.remove_at(position)
    }

    /// Put a dequeued flight back at the front. The caller must hold a free-capacity unit.
    ///
    /// # Errors
    ///
    /// Returns `QueueFull` if no slot is free.
    pub fn requeue_front(&mut self, flight: FlightRequest) -> Result<(), SchedulerError> {
        let id = flight.id;
        self.queue.push_front(flight)?;
        self.events.record(FlightAction::RolledBack, Some(id), None);
        Ok(())
    }

    /// Index of a free runway, if any.
    #[must_use]
    pub fn find_free_runway(&self) -> Option<usize> {
        self.runways.find_free()
    }

    /// Claim a free runway for `flight_id` under a newly issued lease.
    pub fn assign_runway(&mut self, flight_id: FlightId) -> Option<(usize, LeaseToken)> {
        let slot = self.find_free_runway()?;
        let lease = LeaseToken(self.next_lease);
        self.next_lease += 1;
        if !self.runways.occupy(slot, Occupant { lease, flight_id }) {
            return None;
        }
        self.events.record(FlightAction::Dispatched, Some(flight_id), Some(slot));
        Some((slot, lease))
    }

    /// Undo an assignment that never got a worker.
    pub fn unassign_runway(&mut self, slot: usize, lease: LeaseToken) -> bool {
        self.runways.vacate(slot, lease)
    }

    /// Worker-side release with ownership check.
    pub fn release_runway(
        &mut self,
        slot: usize,
        lease: LeaseToken,
        flight_id: FlightId,
        duration_ms: u64,
        completed: bool,
    ) -> ReleaseOutcome {
        let outcome = self
            .runways
            .release(slot, lease, duration_ms, completed, &mut self.metrics);
        let action = match outcome {
            ReleaseOutcome::Released => FlightAction::Released,
            ReleaseOutcome::Cancelled => FlightAction::Cancelled,
            ReleaseOutcome::OwnershipMismatch => FlightAction::OwnershipMismatch,
        };
        self.events.record(action, Some(flight_id), Some(slot));
        outcome
    }

    /// Flag a queued flight as emergency. Returns whether it was found.
    pub fn mark_emergency(&mut self, id: FlightId) -> bool {
        let found = self.queue.mark_emergency(id);
        if found {
            self.events.record(FlightAction::EmergencyMarked, Some(id), None);
        }
        found
    }

    /// Flip severe weather; returns the new value.
    pub fn toggle_weather(&mut self) -> bool {
        self.severe_weather = !self.severe_weather;
        self.events.record(FlightAction::WeatherToggled, None, None);
        self.severe_weather
    }

    /// Record that a flight was lost during a failed rollback.
    pub fn record_dropped(&mut self, flight_id: FlightId) {
        self.events.record(FlightAction::Dropped, Some(flight_id), None);
    }

    /// Current weather flag.
    #[must_use]
    pub const fn severe_weather(&self) -> bool {
        self.severe_weather
    }

    /// Current metrics.
    #[must_use]
    pub const fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// Queue view.
    #[must_use]
    pub const fn queue(&self) -> &FlightQueue {
        &self.queue
    }

    /// Runway view.
    #[must_use]
    pub const fn runways(&self) -> &RunwayTable {
        &self.runways
    }

    /// Full point-in-time copy for read-only observers.
    #[must_use]
    pub fn snapshot(&self) -> AirfieldSnapshot {
        AirfieldSnapshot {
            queue: self.queue.iter().cloned().collect(),
            queue_capacity: self.queue.capacity(),
            runways: self.runways.slots().to_vec(),
            severe_weather: self.severe_weather,
            metrics: self.metrics,
            recent_events: self.events.events(),
        }
    }
}

/// Consistent copy of the whole state, as handed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirfieldSnapshot {
    /// Queued flights, front to back.
    pub queue: Vec<FlightRequest>,
    /// Queue capacity.
    pub queue_capacity: usize,
    /// Runway slots in runway order; `None` is free.
    pub runways: Vec<Option<Occupant>>,
    /// Severe weather flag.
    pub severe_weather: bool,
    /// Aggregate metrics.
    pub metrics: Metrics,
    /// Most recent events, oldest first.
    pub recent_events: Vec<FlightEvent>,
}

impl AirfieldSnapshot {
    /// Number of queued flights.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Number of occupied runways.
    #[must_use]
    pub fn occupied_runways(&self) -> usize {
        self.runways.iter().filter(|slot| slot.is_some()).count()
    }
}

impl fmt::Display for AirfieldSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== STATUS ===")?;
        if self.severe_weather {
            writeln!(f, "Severe weather: ON (emergency landings only)")?;
        } else {
            writeln!(f, "Severe weather: OFF")?;
        }
        writeln!(f, "Queue: {}/{}", self.queue_len(), self.queue_capacity)?;
        if self.queue.is_empty() {
            writeln!(f, "  <queue empty>")?;
        }
        for flight in &self.queue {
            write!(
                f,
                "  {:>3}) {:<31} {:<8} {:>6}ms",
                flight.id, flight.label, flight.kind, flight.occupancy_duration_ms
            )?;
            if flight.emergency {
                write!(f, "  [EMERGENCY]")?;
            }
            writeln!(f)?;
        }
        for (idx, slot) in self.runways.iter().enumerate() {
            match slot {
                Some(occupant) => writeln!(
                    f,
                    "Runway {}: IN USE (flight {}, {})",
                    idx + 1,
                    occupant.flight_id,
                    occupant.lease
                )?,
                None => writeln!(f, "Runway {}: FREE", idx + 1)?,
            }
        }
        write!(
            f,
            "Total assigned: {}, total busy ms: {}",
            self.metrics.total_assigned, self.metrics.total_busy_ms
        )
    }
}
