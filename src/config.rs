//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the tidetemp-config.toml file.
//! It provides a centralized way to configure the NOAA and weather.gov endpoints, the HTTP
//! client, and an optional replacement for the built-in location table.

use crate::{locations, Location};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "tidetemp-config.toml";

/// Application configuration loaded from tidetemp-config.toml
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Remote API configuration
    #[serde(default)]
    pub api: ApiConfig,
    /// Replacement location table; empty means use the built-in table
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
}

/// Remote API endpoints and HTTP client settings
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// NOAA CO-OPS datagetter endpoint
    pub tide_url: String,
    /// weather.gov points endpoint; `/{lat},{lon}` is appended
    pub points_url: String,
    /// Identifying application tag sent to NOAA
    pub application: String,
    /// User-Agent header (weather.gov rejects requests without one)
    pub user_agent: String,
    /// Transport timeout per request in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            tide_url: "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter".to_string(),
            points_url: "https://api.weather.gov/points".to_string(),
            application: "TidePool".to_string(),
            user_agent: "tidetemp/0.1 (tide pool temperature report)".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from tidetemp-config.toml file
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.as_ref().display(),
                        locations = config.locations.len(),
                        "loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    warn!("invalid config file format: {}", e);
                    warn!("using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                info!("no config file found, using default configuration");
                Self::default()
            }
        }
    }

    /// Load configuration from a file the user asked for explicitly.
    ///
    /// Unlike [`Config::load_from_path`], a missing or invalid file is an error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = toml::from_str::<Config>(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Save current configuration to tidetemp-config.toml
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to_path(CONFIG_FILE)
    }

    /// Save current configuration to the given path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }

    /// The location table to run against, shared read-only by every task.
    pub fn location_table(&self) -> Vec<Arc<Location>> {
        let table = if self.locations.is_empty() {
            locations::builtin()
        } else {
            self.locations.clone()
        };
        table.into_iter().map(Arc::new).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.application, "TidePool");
        assert_eq!(config.api.points_url, "https://api.weather.gov/points");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.locations.is_empty());
        assert_eq!(config.location_table().len(), locations::builtin().len());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.api.tide_url, parsed.api.tide_url);
        assert_eq!(config.api.user_agent, parsed.api.user_agent);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config.api.application, "TidePool");
    }

    #[test]
    fn test_from_file_rejects_missing_file() {
        assert!(Config::from_file("/nonexistent/path").is_err());
    }

    #[test]
    fn test_locations_override_builtin_table() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            r#"
[api]
timeout_secs = 5

[[locations]]
name = "Test Cove"
city = "Nowhere"
state = "CA"
station = "9410170"
primary = { lat = 32.5, lon = -117.25 }
backup = { lat = 32.75, lon = -117.0 }
"#,
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        // Unset keys keep their defaults
        assert_eq!(config.api.application, "TidePool");

        let table = config.location_table();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].name, "Test Cove");
        assert_eq!(table[0].backup.lon, -117.0);
    }

    #[test]
    fn test_save_then_load() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.api.application = "Elsewhere".to_string();
        config.save_to_path(file.path()).unwrap();

        let loaded = Config::load_from_path(file.path());
        assert_eq!(loaded.api.application, "Elsewhere");
    }
}
