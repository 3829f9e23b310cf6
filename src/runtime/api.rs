//! API-facing request models and helpers over an [`Airfield`].

use serde::{Deserialize, Serialize};

use crate::core::{Airfield, AirfieldSnapshot, FlightId, FlightKind, SchedulerError};

/// Flight submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightSubmission {
    /// Display label; truncated on enqueue.
    pub label: String,
    /// Landing or takeoff.
    pub kind: FlightKind,
    /// Runway hold time. `None` or zero falls back to the configured default.
    #[serde(default)]
    pub duration_ms: Option<u64>,
    /// Emergency flag.
    #[serde(default)]
    pub emergency: bool,
}

impl FlightSubmission {
    /// Submission with no explicit duration and no emergency.
    pub fn new(label: impl Into<String>, kind: FlightKind) -> Self {
        Self {
            label: label.into(),
            kind,
            duration_ms: None,
            emergency: false,
        }
    }

    /// Set the hold time.
    #[must_use]
    pub const fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Set the emergency flag.
    #[must_use]
    pub const fn with_emergency(mut self, emergency: bool) -> Self {
        self.emergency = emergency;
        self
    }

    /// Hold time after applying `default_ms`.
    #[must_use]
    pub fn effective_duration_ms(&self, default_ms: u64) -> u64 {
        self.duration_ms.filter(|d| *d > 0).unwrap_or(default_ms)
    }
}

/// Queue a submission, waiting while the queue is full.
///
/// # Errors
///
/// `Closed` once the airfield no longer accepts work.
pub async fn submit(
    airfield: &Airfield,
    submission: &FlightSubmission,
) -> Result<FlightId, SchedulerError> {
    let duration_ms = submission.effective_duration_ms(airfield.config().default_duration_ms);
    airfield
        .submit_flight(
            &submission.label,
            submission.kind,
            duration_ms,
            submission.emergency,
        )
        .await
}

/// Queue a submission or fail at once with `QueueFull`.
///
/// # Errors
///
/// `QueueFull` when no slot is free, `Closed` once the airfield is closed.
pub fn try_submit(
    airfield: &Airfield,
    submission: &FlightSubmission,
) -> Result<FlightId, SchedulerError> {
    let duration_ms = submission.effective_duration_ms(airfield.config().default_duration_ms);
    airfield.try_submit_flight(
        &submission.label,
        submission.kind,
        duration_ms,
        submission.emergency,
    )
}

/// Current airfield status.
#[must_use]
pub fn status(airfield: &Airfield) -> AirfieldSnapshot {
    airfield.snapshot()
}
