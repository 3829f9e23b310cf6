//! # Runway Scheduler
//!
//! A bounded, weather-aware runway scheduler for a simulated airfield.
//!
//! Submitters queue landing and takeoff requests into a fixed-capacity
//! circular queue. One or more scheduler engines pull eligible flights off
//! that queue and dispatch each onto a free runway, where an occupancy worker
//! holds the runway for the flight's duration and then releases it.
//!
//! ## Core Problem Solved
//!
//! Several independent actors share one small, bounded piece of state:
//!
//! - **Bounded queue**: submitters block (or fail fast) when the queue is full
//! - **Bounded runways**: never more flights on runways than runways exist
//! - **Weather policy**: under severe weather only emergency landings may
//!   leave the queue, in queue order
//! - **Consistent observers**: status reads see one coherent snapshot
//!
//! ## Key Features
//!
//! - **Permit protocol**: pending-work, free-capacity and free-runway counters
//!   ordered so the state lock is never held across a wait
//! - **Change-driven idling**: engines with nothing eligible sleep until the
//!   next enqueue, emergency mark or weather toggle, without polling
//! - **Leased runways**: each assignment carries a fresh lease token so a
//!   release can only clear the slot it was given
//! - **Structured shutdown**: drain outstanding occupancies or cancel them
//! - **Schedule files**: batch submissions with pacing
//!
//! ```rust,ignore
//! use runway_scheduler::builders::AirfieldBuilder;
//! use runway_scheduler::config::AirfieldConfig;
//! use runway_scheduler::core::{FlightKind, ShutdownMode};
//!
//! let (airfield, engines) = AirfieldBuilder::new(
//!     AirfieldConfig::new().with_queue_capacity(3).with_runway_count(1),
//! )
//! .start()?;
//!
//! airfield.submit_flight("SAS123", FlightKind::Landing, 1500, false).await?;
//! airfield.toggle_weather();
//! println!("{}", airfield.snapshot());
//!
//! let stats = engines.shutdown(ShutdownMode::Drain).await;
//! ```

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling types: flights, queue, runways, permits and engines.
pub mod core;
/// Configuration model for the airfield.
pub mod config;
/// Builders to construct an airfield and its engines from configuration.
pub mod builders;
/// Submission API and schedule-file ingestion.
pub mod runtime;
/// Shared utilities.
pub mod util;
