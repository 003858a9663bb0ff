//! Configuration
//!
//! Resource locations, HTTP settings, map size and logging level, loaded from
//! a TOML file with environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "OPIOID_ATLAS_CONFIG";

const DEATHS_URL: &str = "https://gist.githubusercontent.com/ke1thw/66611f79a85552e39816ed4356f64e0a/raw/92819b8d627e95edd80bfb28eeead778e768fef8/Opioid_Overdose_Deaths.csv";
const UNEMPLOYMENT_URL: &str = "https://gist.githubusercontent.com/ke1thw/3ad13e0b168f9dd72286f0fb792f16f9/raw/2b6232fb8e454fe9e943f406aea6d3f02edb00b4/Unemployment_in_America.csv";
const BOUNDARIES_URL: &str = "https://gist.githubusercontent.com/ke1thw/00ffa23f0248f0814a3bd7de8af236ec/raw/afcc32d94a35e2864dc5a7999b6ec026fa2eca00/usa-map.json";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dataset locations: `http(s)://` URLs or local file paths
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_deaths")]
    pub deaths: String,

    #[serde(default = "default_unemployment")]
    pub unemployment: String,

    #[serde(default = "default_boundaries")]
    pub boundaries: String,
}

fn default_deaths() -> String {
    DEATHS_URL.to_string()
}

fn default_unemployment() -> String {
    UNEMPLOYMENT_URL.to_string()
}

fn default_boundaries() -> String {
    BOUNDARIES_URL.to_string()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            deaths: default_deaths(),
            unemployment: default_unemployment(),
            boundaries: default_boundaries(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("opioid-atlas/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Map canvas size in pixels
#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_map_width")]
    pub width: u32,

    #[serde(default = "default_map_height")]
    pub height: u32,
}

fn default_map_width() -> u32 {
    800
}

fn default_map_height() -> u32 {
    500
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: default_map_width(),
            height: default_map_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "opioid_atlas=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

impl DashboardConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Candidate config files, most specific first
    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            paths.push(PathBuf::from(path));
        }
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("opioid-atlas").join("config.toml"));
        }
        paths.push(PathBuf::from("./opioid-atlas.toml"));
        paths
    }

    /// Load from the first existing candidate file, else defaults; env overrides apply last.
    ///
    /// Runs before logging is initialized, so it reports which file it used
    /// instead of logging.
    pub fn load_default() -> Result<(Self, Option<PathBuf>), ConfigError> {
        for path in Self::candidate_paths() {
            if path.exists() {
                let mut config = Self::load(&path)?;
                config.apply_env_overrides(|key| std::env::var(key).ok());
                return Ok((config, Some(path)));
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok((config, None))
    }

    /// Apply environment variable overrides through a lookup function
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("OPIOID_ATLAS_DEATHS_URL") {
            self.sources.deaths = url;
        }
        if let Some(url) = lookup("OPIOID_ATLAS_UNEMPLOYMENT_URL") {
            self.sources.unemployment = url;
        }
        if let Some(url) = lookup("OPIOID_ATLAS_BOUNDARIES_URL") {
            self.sources.boundaries = url;
        }
        if let Some(level) = lookup("OPIOID_ATLAS_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_public_datasets() {
        let config = DashboardConfig::default();
        assert!(config.sources.deaths.ends_with("Opioid_Overdose_Deaths.csv"));
        assert!(config.sources.unemployment.ends_with("Unemployment_in_America.csv"));
        assert!(config.sources.boundaries.ends_with("usa-map.json"));
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!((config.map.width, config.map.height), (800, 500));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = DashboardConfig::from_toml_str(
            r#"
            [sources]
            deaths = "data/deaths.csv"

            [map]
            width = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.sources.deaths, "data/deaths.csv");
        assert!(config.sources.boundaries.starts_with("https://"));
        assert_eq!(config.map.width, 1000);
        assert_eq!(config.map.height, 500);
        assert_eq!(config.logging.level, "opioid_atlas=info");
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = [
            ("OPIOID_ATLAS_UNEMPLOYMENT_URL", "local/unemployment.csv"),
            ("OPIOID_ATLAS_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = DashboardConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.sources.unemployment, "local/unemployment.csv");
        assert_eq!(config.logging.level, "debug");
        assert!(config.sources.deaths.starts_with("https://"));
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let err = DashboardConfig::load(Path::new("/no/such/opioid-atlas.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
