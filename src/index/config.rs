//! Integrator Configuration
//!
//! Tuning knobs for the paginated intersection and candidate probing. None of
//! them change results, only how many entries each reader call moves.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::observability::{log_event, Event};

use super::errors::{IndexError, IndexResult};

/// Integrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegratorConfig {
    /// Driver pages hold `request.size * driver_page_factor` entries (default: 2)
    #[serde(default = "default_driver_page_factor")]
    pub driver_page_factor: usize,

    /// Maximum candidate keys per probe call (default: 1024)
    #[serde(default = "default_probe_batch_size")]
    pub probe_batch_size: usize,
}

fn default_driver_page_factor() -> usize {
    2
}

fn default_probe_batch_size() -> usize {
    1024
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            driver_page_factor: default_driver_page_factor(),
            probe_batch_size: default_probe_batch_size(),
        }
    }
}

impl IntegratorConfig {
    /// Create a config with a specific probe batch size
    pub fn with_probe_batch_size(probe_batch_size: usize) -> Self {
        Self {
            probe_batch_size,
            ..Default::default()
        }
    }

    /// Rejects values that would stall the page loop
    pub fn validate(&self) -> IndexResult<()> {
        if self.driver_page_factor == 0 {
            return Err(IndexError::InvalidConfig(
                "driver_page_factor must be greater than zero".to_string(),
            ));
        }
        if self.probe_batch_size == 0 {
            return Err(IndexError::InvalidConfig(
                "probe_batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> IndexResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| IndexError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> IndexResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            IndexError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json_str(&json)?;

        log_event(
            Event::ConfigLoaded,
            &[
                ("driver_page_factor", &config.driver_page_factor.to_string()),
                ("path", &path.display().to_string()),
                ("probe_batch_size", &config.probe_batch_size.to_string()),
            ],
        );
        Ok(config)
    }
}
