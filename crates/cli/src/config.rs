//! Configuration loading from revit-bridge.toml.

use serde::Deserialize;
use std::path::Path;

/// Default base URL of the pyRevit Routes API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:48884/revit_mcp_api";

/// Top-level configuration.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Backend connection settings.
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Revit backend configuration.
#[derive(Debug, Deserialize, Default)]
pub struct BackendConfig {
    /// Base URL of the Revit Routes API.
    pub base_url: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Resolve the backend base URL.
    ///
    /// Precedence: command-line flag, then `REVIT_BRIDGE_URL`, then the
    /// config file, then the default.
    pub fn base_url(&self, flag: Option<String>) -> String {
        flag.or_else(|| std::env::var("REVIT_BRIDGE_URL").ok())
            .or_else(|| self.backend.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_backend_url() {
        let config = Config::parse(
            r#"
[backend]
base_url = "http://10.0.0.5:48884/revit_mcp_api"
"#,
        )
        .unwrap();
        assert_eq!(
            config.backend.base_url.as_deref(),
            Some("http://10.0.0.5:48884/revit_mcp_api")
        );
    }

    #[test]
    fn empty_config_is_valid() {
        let config = Config::parse("").unwrap();
        assert!(config.backend.base_url.is_none());
    }

    #[test]
    fn flag_wins_over_config() {
        let config = Config::parse(
            r#"
[backend]
base_url = "http://from-config"
"#,
        )
        .unwrap();
        assert_eq!(
            config.base_url(Some("http://from-flag".to_string())),
            "http://from-flag"
        );
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(Config::parse("backend = [").is_err());
    }
}
