//! Tunables for index building, deferred timers and result rendering.

use crate::error::ConfigError;
use serde::Deserialize;
use std::time::Duration;

/// Search widget configuration.
///
/// Every field has a default, so a TOML document only needs the keys it changes:
///
/// ```toml
/// base_url = "https://docs.example.com/"
/// batch_size = 250
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Records indexed per batch before yielding back to the event loop.
    pub batch_size: usize,
    /// Pause between two index batches.
    pub batch_delay_ms: u64,
    /// How long loading may run before the widget shows a loading indicator.
    pub loading_grace_ms: u64,
    /// Delay between the input losing focus and the widget acting on it.
    pub blur_delay_ms: u64,
    /// Maximum number of rendered result rows.
    pub max_results: usize,
    /// Weight of the `name` field.
    pub name_boost: f32,
    /// Weight of the `parent` field.
    pub parent_boost: f32,
    /// Edit distance tolerated by the fuzzy fallback.
    pub fuzzy_distance: usize,
    /// Prepended to every record url to form the result href.
    pub base_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            batch_delay_ms: 10,
            loading_grace_ms: 500,
            blur_delay_ms: 100,
            max_results: 10,
            name_boost: 10.0,
            parent_boost: 1.0,
            fuzzy_distance: 1,
            base_url: String::new(),
        }
    }
}

impl SearchConfig {
    /// Parse a configuration from TOML, filling missing keys with defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall the builder or hide every result.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Zero {
                field: "batch_size",
            });
        }
        if self.max_results == 0 {
            return Err(ConfigError::Zero {
                field: "max_results",
            });
        }
        Ok(())
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn loading_grace(&self) -> Duration {
        Duration::from_millis(self.loading_grace_ms)
    }

    pub fn blur_delay(&self) -> Duration {
        Duration::from_millis(self.blur_delay_ms)
    }
}
