//! Flight requests as they travel from submitter to runway.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::SchedulerError;

/// Bound on a flight label, counting the terminator slot of the shared layout.
/// Labels keep at most `MAX_NAME_LEN - 1` characters.
pub const MAX_NAME_LEN: usize = 32;

/// Unique, monotonically increasing flight identifier assigned at submission.
pub type FlightId = u64;

/// Operation a flight wants the runway for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightKind {
    /// Arriving flight.
    Landing,
    /// Departing flight.
    Takeoff,
}

impl FlightKind {
    /// Short uppercase tag used in logs and status output.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Landing => "LANDING",
            Self::Takeoff => "TAKEOFF",
        }
    }
}

impl fmt::Display for FlightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.tag())
    }
}

impl FromStr for FlightKind {
    type Err = SchedulerError;

    /// Accepts `landing`/`land` and `takeoff`/`tkof`/`take`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "landing" | "land" => Ok(Self::Landing),
            "takeoff" | "tkof" | "take" => Ok(Self::Takeoff),
            other => Err(SchedulerError::InvalidFlight(format!(
                "unknown flight kind `{other}`"
            ))),
        }
    }
}

/// A flight waiting for, or holding, a runway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRequest {
    /// Identifier assigned at submission.
    pub id: FlightId,
    /// Display name, at most `MAX_NAME_LEN - 1` characters.
    pub label: String,
    /// Landing or takeoff.
    pub kind: FlightKind,
    /// Emergency flag; may be raised while queued.
    pub emergency: bool,
    /// Simulated runway hold time in milliseconds. Always positive.
    pub occupancy_duration_ms: u64,
}

impl FlightRequest {
    /// Build a request, truncating the label and rejecting a zero duration.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidFlight` if `occupancy_duration_ms` is zero.
    pub fn new(
        id: FlightId,
        label: &str,
        kind: FlightKind,
        occupancy_duration_ms: u64,
        emergency: bool,
    ) -> Result<Self, SchedulerError> {
        if occupancy_duration_ms == 0 {
            return Err(SchedulerError::InvalidFlight(
                "occupancy duration must be positive".into(),
            ));
        }
        Ok(Self {
            id,
            label: truncate_label(label),
            kind,
            emergency,
            occupancy_duration_ms,
        })
    }

    /// Eligible while severe weather is active.
    #[must_use]
    pub const fn is_emergency_landing(&self) -> bool {
        self.emergency && matches!(self.kind, FlightKind::Landing)
    }
}

/// Cut a label down to `MAX_NAME_LEN - 1` characters on a char boundary.
#[must_use]
pub fn truncate_label(label: &str) -> String {
    label.trim().chars().take(MAX_NAME_LEN - 1).collect()
}
