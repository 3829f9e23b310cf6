//! Runway occupancy table and aggregate metrics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::FlightId;

/// Number of runways in the shared layout.
pub const RUNWAY_COUNT: usize = 2;

/// Token naming the worker that holds a runway slot.
///
/// Issued at dispatch from a monotonically increasing counter and compared
/// again at release time, so a worker never clears a slot it does not own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LeaseToken(pub u64);

impl fmt::Display for LeaseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lease-{}", self.0)
    }
}

/// Current holder of a runway slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    /// Lease of the occupancy worker.
    pub lease: LeaseToken,
    /// Flight being served.
    pub flight_id: FlightId,
}

/// Aggregate metrics, updated only on a verified runway release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Completed occupancies.
    pub total_assigned: u64,
    /// Sum of completed occupancy durations in milliseconds.
    pub total_busy_ms: u64,
}

impl Metrics {
    fn record(&mut self, duration_ms: u64) {
        self.total_assigned += 1;
        self.total_busy_ms += duration_ms;
    }
}

/// What happened when a worker tried to give its runway back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Slot cleared and metrics updated.
    Released,
    /// Slot cleared after cancellation; metrics untouched.
    Cancelled,
    /// Slot held by someone else (or out of range); left alone.
    OwnershipMismatch,
}

/// Fixed set of runway slots; `None` means free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunwayTable {
    slots: Vec<Option<Occupant>>,
    #[serde(default)]
    vacated: u64,
}

impl RunwayTable {
    /// Create a table with `count` free runways.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            slots: vec![None; count],
            vacated: 0,
        }
    }

    /// Number of runways.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the table has no runways at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// First free slot, scanning from runway 0.
    #[must_use]
    pub fn find_free(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Occupied slot count.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Holder of a slot, if any.
    #[must_use]
    pub fn occupant(&self, slot: usize) -> Option<Occupant> {
        self.slots.get(slot).copied().flatten()
    }

    /// Slots cleared so far. Moves whenever a runway becomes free.
    #[must_use]
    pub const fn vacated(&self) -> u64 {
        self.vacated
    }

    /// All slots in runway order.
    #[must_use]
    pub fn slots(&self) -> &[Option<Occupant>] {
        &self.slots
    }

    /// Record an occupant in a free slot. Returns false if the slot is taken.
    pub fn occupy(&mut self, slot: usize, occupant: Occupant) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry) if entry.is_none() => {
                *entry = Some(occupant);
                true
            }
            _ => false,
        }
    }

    /// Clear a slot only if `lease` still owns it.
    pub fn vacate(&mut self, slot: usize, lease: LeaseToken) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry) if entry.is_some_and(|o| o.lease == lease) => {
                *entry = None;
                self.vacated = self.vacated.wrapping_add(1);
                true
            }
            _ => false,
        }
    }

    /// Worker release: verify ownership, clear, and count completed work.
    pub fn release(
        &mut self,
        slot: usize,
        lease: LeaseToken,
        duration_ms: u64,
        completed: bool,
        metrics: &mut Metrics,
    ) -> ReleaseOutcome {
        if !self.vacate(slot, lease) {
            return ReleaseOutcome::OwnershipMismatch;
        }
        if completed {
            metrics.record(duration_ms);
            ReleaseOutcome::Released
        } else {
            ReleaseOutcome::Cancelled
        }
    }
}

impl Default for RunwayTable {
    fn default() -> Self {
        Self::new(RUNWAY_COUNT)
    }
}
