//! Engine configuration loaded from JSON.

use std::path::{Path, PathBuf};

use engine_event::BusConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tick::TickConfig;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for [`EngineConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the engine cannot run with.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level engine configuration. Every field has a default, so `{}` is a
/// valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tick loop pacing.
    pub tick: TickConfig,
    /// Event bus limits.
    pub bus: BusConfig,
}

impl EngineConfig {
    /// Parse and validate a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Check that every field holds a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tick.validate()?;
        if self.bus.max_publish_depth == 0 {
            return Err(ConfigError::Invalid(
                "bus.max_publish_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Override the tick rate.
    #[must_use]
    pub fn with_tick_rate(mut self, tick_rate: f64) -> Self {
        self.tick.tick_rate = tick_rate;
        self
    }

    /// Override the tick limit (0 = unlimited).
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.tick.max_ticks = max_ticks;
        self
    }

    /// Override the nested publish bound.
    #[must_use]
    pub fn with_max_publish_depth(mut self, depth: usize) -> Self {
        self.bus = self.bus.with_max_publish_depth(depth);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_yields_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.tick.tick_rate, 60.0);
        assert_eq!(config.tick.max_ticks, 0);
        assert_eq!(config.bus.max_publish_depth, 16);
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "tick": { "max_ticks": 90 } }"#).unwrap();
        assert_eq!(config.tick.max_ticks, 90);
        assert_eq!(config.tick.tick_rate, 60.0);
        assert_eq!(config.bus, BusConfig::default());
    }

    #[test]
    fn test_invalid_tick_rate_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "tick": { "tick_rate": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_publish_depth_is_rejected() {
        let config = EngineConfig::default().with_max_publish_depth(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = EngineConfig::from_json_str("{ tick: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = EngineConfig::load("/definitely/not/here/engine.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("engine.json"));
    }

    #[test]
    fn test_builders_override_fields() {
        let config = EngineConfig::default()
            .with_tick_rate(30.0)
            .with_max_ticks(10)
            .with_max_publish_depth(4);
        assert_eq!(config.tick.tick_rate, 30.0);
        assert_eq!(config.tick.max_ticks, 10);
        assert_eq!(config.bus.max_publish_depth, 4);
        assert!(config.validate().is_ok());
    }
}
