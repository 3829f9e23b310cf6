//! Airfield configuration structures.

use serde::{Deserialize, Serialize};

use crate::core::{QUEUE_CAPACITY, RUNWAY_COUNT};

/// Occupancy applied when a submission carries no usable duration.
pub const DEFAULT_DURATION_MS: u64 = 2000;

/// Recent events kept for observers.
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 64;

const ENV_SCHEDULER_COUNT: &str = "RUNWAY_SCHEDULER_COUNT";
const ENV_DEFAULT_DURATION_MS: &str = "RUNWAY_DEFAULT_DURATION_MS";
const ENV_EVENT_LOG_CAPACITY: &str = "RUNWAY_EVENT_LOG_CAPACITY";

/// Airfield configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirfieldConfig {
    /// Queue slots.
    pub queue_capacity: usize,
    /// Runways available for assignment.
    pub runway_count: usize,
    /// Scheduler engines started against the airfield.
    pub scheduler_count: usize,
    /// Duration used when a submission omits one, in milliseconds.
    pub default_duration_ms: u64,
    /// Size of the recent-event ring.
    pub event_log_capacity: usize,
}

impl Default for AirfieldConfig {
    fn default() -> Self {
        Self {
            queue_capacity: QUEUE_CAPACITY,
            runway_count: RUNWAY_COUNT,
            scheduler_count: 1,
            default_duration_ms: DEFAULT_DURATION_MS,
            event_log_capacity: DEFAULT_EVENT_LOG_CAPACITY,
        }
    }
}

impl AirfieldConfig {
    /// Start from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the queue capacity.
    #[must_use]
    pub const fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Override the runway count.
    #[must_use]
    pub const fn with_runway_count(mut self, runway_count: usize) -> Self {
        self.runway_count = runway_count;
        self
    }

    /// Override the number of scheduler engines.
    #[must_use]
    pub const fn with_scheduler_count(mut self, scheduler_count: usize) -> Self {
        self.scheduler_count = scheduler_count;
        self
    }

    /// Override the default occupancy duration.
    #[must_use]
    pub const fn with_default_duration_ms(mut self, default_duration_ms: u64) -> Self {
        self.default_duration_ms = default_duration_ms;
        self
    }

    /// Override the event ring size.
    #[must_use]
    pub const fn with_event_log_capacity(mut self, event_log_capacity: usize) -> Self {
        self.event_log_capacity = event_log_capacity;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be greater than 0".into());
        }
        if self.runway_count == 0 {
            return Err("runway_count must be greater than 0".into());
        }
        if self.scheduler_count == 0 {
            return Err("scheduler_count must be greater than 0".into());
        }
        if self.default_duration_ms == 0 {
            return Err("default_duration_ms must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a message on parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults overridden from the environment (and a `.env` file, if any).
    ///
    /// Only the engine count, default duration and event ring size are read;
    /// queue capacity and runway count stay at the layout constants.
    ///
    /// # Errors
    ///
    /// Returns a message if a variable is present but not a valid number, or
    /// if the result fails validation.
    pub fn from_env() -> Result<Self, String> {
        // a missing .env file is fine
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();
        if let Some(count) = env_number(ENV_SCHEDULER_COUNT)? {
            cfg.scheduler_count = count;
        }
        if let Some(duration) = env_number(ENV_DEFAULT_DURATION_MS)? {
            cfg.default_duration_ms = duration;
        }
        if let Some(capacity) = env_number(ENV_EVENT_LOG_CAPACITY)? {
            cfg.event_log_capacity = capacity;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Result<Option<T>, String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{key} must be a number, got `{raw}`")),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_layout_constants() {
        let cfg = AirfieldConfig::default();
        assert_eq!(cfg.queue_capacity, 256);
        assert_eq!(cfg.runway_count, 2);
        assert_eq!(cfg.default_duration_ms, 2000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(AirfieldConfig::new().with_queue_capacity(0).validate().is_err());
        assert!(AirfieldConfig::new().with_runway_count(0).validate().is_err());
        assert!(AirfieldConfig::new().with_scheduler_count(0).validate().is_err());
        assert!(AirfieldConfig::new().with_default_duration_ms(0).validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg = AirfieldConfig::from_json_str(r#"{ "queue_capacity": 3, "runway_count": 1 }"#)
            .unwrap();
        assert_eq!(cfg.queue_capacity, 3);
        assert_eq!(cfg.runway_count, 1);
        assert_eq!(cfg.scheduler_count, 1);
    }

    #[test]
    fn test_invalid_json() {
        assert!(AirfieldConfig::from_json_str("{ not json").is_err());
        assert!(AirfieldConfig::from_json_str(r#"{ "runway_count": 0 }"#).is_err());
    }
}
