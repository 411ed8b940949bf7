use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Solver limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// The IDA* depth ceiling for every search. Pairing steps count
    /// generators, not moves.
    pub max_phase_depth: u8,
    /// Moves in a random scramble.
    pub scramble_length: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_phase_depth: 20,
            scramble_length: 80,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read the solver configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse the solver configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl SolverConfig {
    /// # Errors
    ///
    /// Fails on malformed TOML or unknown keys.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_defaults() {
        let config = SolverConfig::default();
        assert_eq!(SolverConfig::from_toml_str("").unwrap(), config);
        assert_eq!(config.max_phase_depth, 20);
        assert_eq!(config.scramble_length, 80);
    }

    #[test_log::test]
    fn test_partial_override() {
        let config = SolverConfig::from_toml_str("scramble_length = 25").unwrap();
        assert_eq!(config.scramble_length, 25);
        assert_eq!(config.max_phase_depth, 20);
    }

    #[test_log::test]
    fn test_rejects_bad_config() {
        assert!(matches!(
            SolverConfig::from_toml_str("max_phase_depth = 300"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SolverConfig::from_toml_str("depth = 3"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SolverConfig::load("/nonexistent/threephase.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test_log::test]
    fn test_round_trip() {
        let config = SolverConfig {
            max_phase_depth: 14,
            scramble_length: 40,
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(SolverConfig::from_toml_str(&text).unwrap(), config);
    }
}
