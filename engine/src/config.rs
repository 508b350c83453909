//! Engine configuration.
//!
//! Read once from the JSON file named by `ENTENTE_CONFIG` (all keys optional),
//! then adjustable key by key through the driver's `setoption`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "ENTENTE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: String, value: String },
}

/// Tunables shared by every game in the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on adjudication passes before giving up.
    pub max_resolution_passes: usize,
    /// Supply centers needed for a solo victory.
    pub victory_centers: usize,
    pub starting_year: u16,
    /// Seat joining players on a random free power instead of in turn.
    pub random_seating: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { max_resolution_passes: 256, victory_centers: 18, starting_year: 1901, random_seating: false }
    }
}

impl EngineConfig {
    /// Loads the file named by `ENTENTE_CONFIG`, or the defaults if unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Sets a single option by name.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue { name: name.to_string(), value: value.to_string() };
        let mut next = self.clone();
        match name {
            "max_resolution_passes" => next.max_resolution_passes = value.parse().map_err(|_| invalid())?,
            "victory_centers" => next.victory_centers = value.parse().map_err(|_| invalid())?,
            "starting_year" => next.starting_year = value.parse().map_err(|_| invalid())?,
            "random_seating" => next.random_seating = value.parse().map_err(|_| invalid())?,
            _ => return Err(ConfigError::UnknownOption(name.to_string())),
        }
        next.check().map_err(|_| invalid())?;
        *self = next;
        Ok(())
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.max_resolution_passes == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_resolution_passes".into(),
                value: self.max_resolution_passes.to_string(),
            });
        }
        if self.victory_centers == 0 || self.victory_centers > crate::board::SUPPLY_CENTER_COUNT {
            return Err(ConfigError::InvalidValue {
                name: "victory_centers".into(),
                value: self.victory_centers.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.max_resolution_passes, 256);
        assert_eq!(c.victory_centers, 18);
        assert_eq!(c.starting_year, 1901);
        assert!(!c.random_seating);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = EngineConfig::from_json(r#"{"victory_centers": 24}"#).unwrap();
        assert_eq!(c.victory_centers, 24);
        assert_eq!(c.max_resolution_passes, 256);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"victory_centers": 40}"#),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(EngineConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn set_option_by_name() {
        let mut c = EngineConfig::default();
        c.set_option("random_seating", "true").unwrap();
        assert!(c.random_seating);
        c.set_option("starting_year", "1910").unwrap();
        assert_eq!(c.starting_year, 1910);
        assert!(matches!(c.set_option("threads", "4"), Err(ConfigError::UnknownOption(_))));
        assert!(matches!(c.set_option("victory_centers", "0"), Err(ConfigError::InvalidValue { .. })));
        assert_eq!(c.victory_centers, 18);
    }

    #[test]
    fn load_missing_file() {
        let err = EngineConfig::load(Path::new("/nonexistent/entente.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
