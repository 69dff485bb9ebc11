//! Server configuration

use anyhow::{Context, Result};
use diagnosis_lib::history::DEFAULT_HISTORY_CAPACITY;
use serde::Deserialize;

/// Server configuration, read from `DIAGNOSIS_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of predictions kept in history
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Seed for reproducible simulated predictions
    #[serde(default)]
    pub seed: Option<u64>,

    /// Largest accepted image upload, in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

fn default_port() -> u16 {
    8000
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_max_upload_mb() -> usize {
    20
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            history_capacity: default_history_capacity(),
            seed: None,
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("DIAGNOSIS").try_parsing(true))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(source)
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid DIAGNOSIS_* configuration")
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix("DIAGNOSIS")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_source(env(&[])).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.history_capacity, 100);
        assert_eq!(config.seed, None);
        assert_eq!(config.max_upload_bytes(), 20 * 1024 * 1024);
    }

    #[test]
    fn test_environment_overrides() {
        let config = ServerConfig::from_source(env(&[
            ("DIAGNOSIS_PORT", "9100"),
            ("DIAGNOSIS_HISTORY_CAPACITY", "5"),
            ("DIAGNOSIS_SEED", "42"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.history_capacity, 5);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(ServerConfig::from_source(env(&[("DIAGNOSIS_PORT", "not-a-port")])).is_err());
    }
}
