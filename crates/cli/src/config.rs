//! Configuration management for the CLI

use anyhow::{Context, Result};
use diagnosis_lib::predictor::DEFAULT_REMOTE_TIMEOUT;
use diagnosis_lib::DEFAULT_API_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::output::OutputFormat;

/// Defaults read from `~/.config/dx/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API endpoint URL
    pub api_url: Option<String>,
    /// Remote prediction timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Never contact the backend
    pub offline: Option<bool>,
    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    fn config_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("dx").join("config.json"))
    }
}

/// Effective settings after merging flags, environment and config file
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub timeout: Duration,
    pub offline: bool,
    pub format: OutputFormat,
}

/// Values supplied on the command line (or through `DX_*` variables)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub offline: bool,
    pub format: Option<OutputFormat>,
}

impl Settings {
    pub fn resolve(overrides: Overrides, config: Config) -> Self {
        let timeout = overrides
            .timeout_secs
            .or(config.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REMOTE_TIMEOUT);

        let format = overrides
            .format
            .or_else(|| {
                config
                    .default_format
                    .as_deref()
                    .and_then(OutputFormat::parse_name)
            })
            .unwrap_or_default();

        Self {
            api_url: overrides
                .api_url
                .or(config.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout,
            offline: overrides.offline || config.offline.unwrap_or(false),
            format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"api_url": "http://diagnosis.internal:9000", "timeout_secs": 3, "default_format": "json"}}"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        let settings = Settings::resolve(Overrides::default(), config);
        assert_eq!(settings.api_url, "http://diagnosis.internal:9000");
        assert_eq!(settings.timeout, Duration::from_secs(3));
        assert_eq!(settings.format, OutputFormat::Json);
        assert!(!settings.offline);
    }

    #[test]
    fn test_invalid_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let config = Config {
            api_url: Some("http://from-file".to_string()),
            timeout_secs: Some(30),
            offline: Some(true),
            default_format: Some("json".to_string()),
        };
        let overrides = Overrides {
            api_url: Some("http://from-flag".to_string()),
            timeout_secs: Some(2),
            offline: false,
            format: Some(OutputFormat::Table),
        };

        let settings = Settings::resolve(overrides, config);
        assert_eq!(settings.api_url, "http://from-flag");
        assert_eq!(settings.timeout, Duration::from_secs(2));
        assert!(settings.offline);
        assert_eq!(settings.format, OutputFormat::Table);
    }

    #[test]
    fn test_builtin_defaults() {
        let settings = Settings::resolve(Overrides::default(), Config::default());
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.timeout, DEFAULT_REMOTE_TIMEOUT);
        assert_eq!(settings.format, OutputFormat::Table);
    }
}
