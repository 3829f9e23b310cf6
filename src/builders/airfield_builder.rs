//! Builder that turns configuration into a running airfield.

use crate::config::AirfieldConfig;
use crate::core::{Airfield, EngineHandle, SchedulerError};

/// Collects configuration and starts an airfield with its engines.
#[derive(Debug, Clone, Default)]
pub struct AirfieldBuilder {
    config: AirfieldConfig,
}

impl AirfieldBuilder {
    /// Builder over an explicit configuration.
    #[must_use]
    pub const fn new(config: AirfieldConfig) -> Self {
        Self { config }
    }

    /// Builder over a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Config` on parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, SchedulerError> {
        AirfieldConfig::from_json_str(input)
            .map(Self::new)
            .map_err(SchedulerError::Config)
    }

    /// Builder over defaults overridden from the environment.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Config` if a variable is malformed.
    pub fn from_env() -> Result<Self, SchedulerError> {
        AirfieldConfig::from_env()
            .map(Self::new)
            .map_err(SchedulerError::Config)
    }

    /// Configuration to be used.
    #[must_use]
    pub const fn config(&self) -> &AirfieldConfig {
        &self.config
    }

    /// Override the number of scheduler engines.
    #[must_use]
    pub const fn scheduler_count(mut self, count: usize) -> Self {
        self.config.scheduler_count = count;
        self
    }

    /// Build the airfield without starting any engine.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Config` if the configuration is invalid.
    pub fn build(self) -> Result<Airfield, SchedulerError> {
        Airfield::new(self.config)
    }

    /// Build the airfield and start `scheduler_count` engines on the
    /// current tokio runtime.
    ///
    /// # Errors
    ///
    /// `Config` for invalid configuration, `Setup` outside a tokio runtime.
    pub fn start(self) -> Result<(Airfield, EngineHandle), SchedulerError> {
        let count = self.config.scheduler_count;
        let airfield = self.build()?;
        let engines = EngineHandle::spawn(&airfield, count)?;
        Ok((airfield, engines))
    }
}

/// Build an airfield from `cfg` and start its engines.
///
/// # Errors
///
/// See [`AirfieldBuilder::start`].
pub fn build_airfield(cfg: &AirfieldConfig) -> Result<(Airfield, EngineHandle), SchedulerError> {
    AirfieldBuilder::new(cfg.clone()).start()
}
