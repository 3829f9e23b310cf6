//! Occupancy worker: holds one runway for one flight, then releases it.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::airfield::Airfield;
use crate::core::runway::{LeaseToken, ReleaseOutcome};
use crate::core::FlightId;

/// A runway handed to a worker by a scheduler engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunwayAssignment {
    /// Zero-based runway index.
    pub slot: usize,
    /// Lease written into the runway slot at assignment.
    pub lease: LeaseToken,
    /// Flight holding the runway.
    pub flight_id: FlightId,
    /// Flight label, for logs.
    pub label: String,
    /// How long to hold the runway.
    pub duration_ms: u64,
}

/// What a finished worker reports back to its engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyReport {
    /// Flight that held the runway.
    pub flight_id: FlightId,
    /// Zero-based runway index.
    pub slot: usize,
    /// How the release went.
    pub outcome: ReleaseOutcome,
}

/// Holds the runway permit for the lifetime of a worker.
///
/// Dropping the guard returns the permit, so the count is restored even if
/// the worker task is aborted mid-sleep. An unfinished guard also clears the
/// slot as a cancellation.
struct HeldRunway {
    airfield: Airfield,
    assignment: RunwayAssignment,
    outcome: Option<ReleaseOutcome>,
}

impl HeldRunway {
    const fn new(airfield: Airfield, assignment: RunwayAssignment) -> Self {
        Self {
            airfield,
            assignment,
            outcome: None,
        }
    }

    fn release(&mut self, completed: bool) -> ReleaseOutcome {
        let a = &self.assignment;
        let outcome = self.airfield.state().lock().release_runway(
            a.slot,
            a.lease,
            a.flight_id,
            a.duration_ms,
            completed,
        );
        self.outcome = Some(outcome);
        if outcome != ReleaseOutcome::OwnershipMismatch {
            self.airfield.permits().runway_vacated().notify_waiters();
        }
        outcome
    }
}

impl Drop for HeldRunway {
    fn drop(&mut self) {
        if self.outcome.is_none() {
            self.release(false);
        }
        self.airfield.permits().release_runway();
    }
}

/// Occupy the assigned runway for its duration, or until `cancel` fires.
///
/// On normal completion the slot is cleared and metrics are credited. On
/// cancellation the slot is cleared without touching metrics. Either way the
/// runway permit is returned exactly once.
pub async fn occupy_runway(
    airfield: Airfield,
    assignment: RunwayAssignment,
    cancel: CancellationToken,
) -> OccupancyReport {
    let flight_id = assignment.flight_id;
    let slot = assignment.slot;
    let duration = Duration::from_millis(assignment.duration_ms);
    info!(
        flight_id,
        label = %assignment.label,
        runway = slot + 1,
        lease = %assignment.lease,
        duration_ms = assignment.duration_ms,
        "runway occupied"
    );

    let mut held = HeldRunway::new(airfield, assignment);
    let completed = tokio::select! {
        () = tokio::time::sleep(duration) => true,
        () = cancel.cancelled() => false,
    };
    let outcome = held.release(completed);
    drop(held);

    match outcome {
        ReleaseOutcome::Released => info!(flight_id, runway = slot + 1, "runway released"),
        ReleaseOutcome::Cancelled => info!(flight_id, runway = slot + 1, "occupancy cancelled"),
        ReleaseOutcome::OwnershipMismatch => warn!(
            flight_id,
            runway = slot + 1,
            "runway slot held by another lease; left untouched"
        ),
    }

    OccupancyReport {
        flight_id,
        slot,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AirfieldConfig;

    async fn assigned(airfield: &Airfield, flight_id: FlightId, duration_ms: u64) -> RunwayAssignment {
        airfield.permits().acquire_runway().await.unwrap();
        let (slot, lease) = airfield.state().lock().assign_runway(flight_id).unwrap();
        RunwayAssignment {
            slot,
            lease,
            flight_id,
            label: format!("F{flight_id}"),
            duration_ms,
        }
    }

    fn airfield() -> Airfield {
        Airfield::new(AirfieldConfig::new().with_runway_count(1)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_occupancy_credits_metrics() {
        let airfield = airfield();
        let assignment = assigned(&airfield, 7, 300).await;
        assert_eq!(airfield.runways_checked_out(), 1);

        let report = occupy_runway(airfield.clone(), assignment, CancellationToken::new()).await;
        assert_eq!(report.outcome, ReleaseOutcome::Released);
        assert_eq!(airfield.runways_checked_out(), 0);

        let snap = airfield.snapshot();
        assert_eq!(snap.occupied_runways(), 0);
        assert_eq!(snap.metrics.total_assigned, 1);
        assert_eq!(snap.metrics.total_busy_ms, 300);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_occupancy_skips_metrics() {
        let airfield = airfield();
        let assignment = assigned(&airfield, 3, 60_000).await;
        let cancel = CancellationToken::new();
        let worker = tokio::spawn(occupy_runway(airfield.clone(), assignment, cancel.clone()));

        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();
        let report = worker.await.unwrap();

        assert_eq!(report.outcome, ReleaseOutcome::Cancelled);
        assert_eq!(airfield.runways_checked_out(), 0);
        assert_eq!(airfield.snapshot().metrics.total_assigned, 0);
        assert_eq!(airfield.snapshot().occupied_runways(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_worker_still_returns_permit() {
        let airfield = airfield();
        let assignment = assigned(&airfield, 4, 60_000).await;
        let worker = tokio::spawn(occupy_runway(
            airfield.clone(),
            assignment,
            CancellationToken::new(),
        ));
        tokio::time::sleep(Duration::from_millis(10)).await;
        worker.abort();
        assert!(worker.await.unwrap_err().is_cancelled());

        assert_eq!(airfield.runways_checked_out(), 0);
        assert_eq!(airfield.snapshot().occupied_runways(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mismatched_lease_leaves_slot_alone() {
        let airfield = airfield();
        let mut assignment = assigned(&airfield, 5, 20).await;
        assignment.lease = LeaseToken(assignment.lease.0 + 99);

        let report = occupy_runway(airfield.clone(), assignment, CancellationToken::new()).await;
        assert_eq!(report.outcome, ReleaseOutcome::OwnershipMismatch);
        assert_eq!(airfield.snapshot().occupied_runways(), 1);
        // the permit still goes back
        assert_eq!(airfield.runways_checked_out(), 0);
    }
}
