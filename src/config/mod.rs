//! Configuration models for the airfield and its engines.

pub mod airfield;

pub use airfield::{AirfieldConfig, DEFAULT_DURATION_MS, DEFAULT_EVENT_LOG_CAPACITY};
