//! Configuration for the crowd density emitter.
//!
//! Every default is the value the emitter was built around; a config file
//! only overrides them.

use crate::core::{DENSITY_MAX, DENSITY_MIN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Ingest endpoint readings are posted to.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/crowd-data";

/// Pause between full cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Main configuration for the emitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL readings are POSTed to
    pub endpoint: String,

    /// Pause between full cycles
    #[serde(with = "duration_serde")]
    pub interval: Duration,

    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout_secs: Option<u64>,

    /// Lower bound for generated densities
    pub density_min: f64,

    /// Upper bound for generated densities
    pub density_max: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            interval: DEFAULT_INTERVAL,
            request_timeout_secs: None,
            density_min: DENSITY_MIN,
            density_max: DENSITY_MAX,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("crowd-density-emitter")
            .join("config.json")
    }

    /// Check that the configuration can drive the emitter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| ConfigError::Invalid(format!("endpoint '{}': {e}", self.endpoint)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "endpoint '{}' must use http or https",
                self.endpoint
            )));
        }

        if !self.density_min.is_finite() || !self.density_max.is_finite() {
            return Err(ConfigError::Invalid(
                "density bounds must be finite".to_string(),
            ));
        }
        if !(self.density_max - self.density_min).is_finite() {
            return Err(ConfigError::Invalid(format!(
                "density range {}..={} is too wide",
                self.density_min, self.density_max
            )));
        }
        if self.density_min > self.density_max {
            return Err(ConfigError::Invalid(format!(
                "density_min {} exceeds density_max {}",
                self.density_min, self.density_max
            )));
        }

        Ok(())
    }

    /// Request timeout as a `Duration`, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.endpoint, "http://localhost:5000/api/crowd-data");
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.density_min, 2.5);
        assert_eq!(config.density_max, 9.8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            endpoint: "http://127.0.0.1:9000/api/crowd-data".to_string(),
            interval: Duration::from_secs(2),
            request_timeout_secs: Some(3),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"interval\": 2"));

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.request_timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "interval": 1 }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.interval, Duration::from_secs(1));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            density_min: 9.0,
            density_max: 3.0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = Config {
            endpoint: "ftp://localhost/api".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = Config {
            endpoint: "not a url".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            density_max: f64::NAN,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        // Both bounds finite, but the span overflows.
        let config = Config {
            density_min: -1e308,
            density_max: 1e308,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_valid_bounds_drive_generator() {
        let config = Config {
            density_min: 0.0,
            density_max: 100.0,
            ..Config::default()
        };
        assert!(config.validate().is_ok());

        let mut generator = crate::core::DensityGenerator::with_seed(
            1,
            config.density_min,
            config.density_max,
        );
        let d = generator.next_density();
        assert!((0.0..=100.0).contains(&d));
    }
}
