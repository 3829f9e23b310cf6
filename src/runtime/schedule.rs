//! Schedule files: batches of flights submitted in order with a fixed pacing.
//!
//! One flight per line, whitespace separated:
//!
//! ```text
//! # label  kind     duration_ms  emergency
//! SAS123   landing  1500         0
//! NAX9     tkof     800          1
//! ```
//!
//! A duration of zero or less means "use the configured default".

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::core::{Airfield, AppResult, FlightId, FlightKind, SchedulerError};
use crate::runtime::api::{submit, FlightSubmission};

/// Delay between consecutive schedule submissions.
pub const DEFAULT_PACING: Duration = Duration::from_millis(100);

/// Parse schedule text into submissions.
///
/// Blank lines and `#` comments are skipped. Lines naming an unknown flight
/// kind are skipped with a warning.
///
/// # Errors
///
/// `SchedulerError::Schedule` for a missing field or a malformed number.
pub fn parse_schedule(text: &str) -> Result<Vec<FlightSubmission>, SchedulerError> {
    let mut submissions = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }

        let fields: Vec<&str> = content.split_whitespace().collect();
        let [label, kind, duration, emergency] = fields[..] else {
            return Err(SchedulerError::Schedule {
                line,
                reason: format!("expected 4 fields, found {}", fields.len()),
            });
        };

        let Ok(kind) = kind.parse::<FlightKind>() else {
            warn!(line, kind, "unknown flight kind; line skipped");
            continue;
        };
        let duration: i64 = duration.parse().map_err(|_| SchedulerError::Schedule {
            line,
            reason: format!("duration `{duration}` is not a number"),
        })?;
        let emergency: i64 = emergency.parse().map_err(|_| SchedulerError::Schedule {
            line,
            reason: format!("emergency flag `{emergency}` is not a number"),
        })?;

        submissions.push(FlightSubmission {
            label: label.to_owned(),
            kind,
            duration_ms: u64::try_from(duration).ok().filter(|d| *d > 0),
            emergency: emergency != 0,
        });
    }
    debug!(flights = submissions.len(), "schedule parsed");
    Ok(submissions)
}

/// Read and parse a schedule file.
///
/// # Errors
///
/// Fails if the file cannot be read or does not parse.
pub fn load_schedule(path: impl AsRef<Path>) -> AppResult<Vec<FlightSubmission>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading schedule {}", path.display()))?;
    let submissions =
        parse_schedule(&text).with_context(|| format!("parsing schedule {}", path.display()))?;
    info!(path = %path.display(), flights = submissions.len(), "schedule loaded");
    Ok(submissions)
}

/// Submit every flight in order, sleeping `pacing` after each one.
///
/// # Errors
///
/// Stops at the first submission error, typically `Closed`.
pub async fn ingest(
    airfield: &Airfield,
    submissions: &[FlightSubmission],
    pacing: Duration,
) -> Result<Vec<FlightId>, SchedulerError> {
    let mut ids = Vec::with_capacity(submissions.len());
    for submission in submissions {
        ids.push(submit(airfield, submission).await?);
        if !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }
    }
    info!(flights = ids.len(), "schedule ingested");
    Ok(ids)
}
