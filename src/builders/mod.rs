//! Builders to construct an airfield and its engines from configuration.

pub mod airfield_builder;

pub use airfield_builder::{build_airfield, AirfieldBuilder};
