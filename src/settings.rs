//! Match configuration
//!
//! Chosen in the lobby before a match starts and read-only afterwards.
//! Stored as JSON; a missing or unreadable file falls back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::MAX_NEUTRALS_PER_HALF;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Neutral piece counts and optional RNG seed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Prisms scattered into each half (0-3)
    pub prism_count: u8,
    /// Blocks scattered into each half (0-3)
    pub block_count: u8,
    /// Fixed seed for replays; hosts pick one when absent
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            prism_count: 2,
            block_count: 2,
            seed: None,
        }
    }
}

impl MatchConfig {
    /// Counts are clamped to the per-half maximum
    pub fn new(prism_count: u8, block_count: u8) -> Self {
        Self {
            prism_count: prism_count.min(MAX_NEUTRALS_PER_HALF),
            block_count: block_count.min(MAX_NEUTRALS_PER_HALF),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Clamp counts that came in from an untrusted source
    pub fn clamped(self) -> Self {
        Self {
            seed: self.seed,
            ..Self::new(self.prism_count, self.block_count)
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.clamped())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Read a config file, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded match config from {}", path.display());
                config
            }
            Err(err) => {
                log::info!("Using default match config ({err})");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_counts() {
        let config = MatchConfig::default();
        assert_eq!(config.prism_count, 2);
        assert_eq!(config.block_count, 2);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_new_clamps() {
        let config = MatchConfig::new(9, 3);
        assert_eq!(config.prism_count, 3);
        assert_eq!(config.block_count, 3);
    }

    #[test]
    fn test_from_json_partial_and_clamped() {
        let config = MatchConfig::from_json(r#"{"prism_count": 7, "seed": 42}"#).unwrap();
        assert_eq!(config.prism_count, 3);
        assert_eq!(config.block_count, 2);
        assert_eq!(config.seed, Some(42));

        let back = MatchConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_bad_json_rejected() {
        assert!(matches!(
            MatchConfig::from_json("{prism_count:"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = MatchConfig::load_or_default("/nonexistent/prism-duel.json");
        assert_eq!(config, MatchConfig::default());
        assert!(matches!(
            MatchConfig::load("/nonexistent/prism-duel.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
