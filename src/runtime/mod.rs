//! Submitter-facing API and schedule-file ingestion.

pub mod api;
pub mod schedule;

pub use api::{status, submit, try_submit, FlightSubmission};
pub use schedule::{ingest, load_schedule, parse_schedule, DEFAULT_PACING};
