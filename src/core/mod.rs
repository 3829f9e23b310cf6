//! Core scheduling types: flights, queue, runways, permits and engines.

pub mod error;
pub mod flight;
pub mod queue;
pub mod runway;
pub mod audit;
pub mod state;
pub mod permits;
pub mod airfield;
pub mod worker;
pub mod engine;

pub use error::{AppResult, SchedulerError};
pub use flight::{truncate_label, FlightId, FlightKind, FlightRequest, MAX_NAME_LEN};
pub use queue::{FlightQueue, QUEUE_CAPACITY};
pub use runway::{LeaseToken, Metrics, Occupant, ReleaseOutcome, RunwayTable, RUNWAY_COUNT};
pub use audit::{EventLog, FlightAction, FlightEvent};
pub use state::{AirfieldSnapshot, AirfieldState};
pub use permits::{PendingWork, Permits};
pub use airfield::Airfield;
pub use worker::{occupy_runway, OccupancyReport, RunwayAssignment};
pub use engine::{EngineHandle, EngineStats, SchedulerEngine, ShutdownMode};
