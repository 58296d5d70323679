//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Command-line arguments

use crate::error::{Error, Result};
use gatewire_core::streaming::DEFAULT_STREAM_QUERY;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings
    pub logging: LoggingSettings,

    /// Output settings
    pub output: OutputConfig,

    /// Directory of model spec definition files loaded on top of the built-ins
    pub schemas_dir: Option<PathBuf>,

    /// Named routes
    pub routes: HashMap<String, RouteConfig>,

    /// Provider model identifiers mapped to foundation model names
    pub model_aliases: HashMap<String, String>,
}

/// Logging settings from the configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level used when no verbosity flag is given
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: String,

    /// Use colored output by default
    pub color: bool,

    /// Pretty-print JSON output
    pub pretty: bool,
}

/// A named route binding a provider, a model and a stream query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub provider: Option<String>,
    pub model: Option<String>,

    /// Path-query expression selecting streamed text for this route
    pub stream_query: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
            pretty: false,
        }
    }
}

impl RouteConfig {
    /// Stream query for this route, or the chat-delta default
    pub fn stream_query(&self) -> &str {
        self.stream_query.as_deref().unwrap_or(DEFAULT_STREAM_QUERY)
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;

        let config = if is_yaml(path) {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in &Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "Loaded configuration");
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to load config");
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".gatewire.yaml"),
            PathBuf::from(".gatewire.json"),
            PathBuf::from("gatewire.yaml"),
            PathBuf::from("gatewire.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let gatewire_dir = config_dir.join("gatewire");
            paths.push(gatewire_dir.join("config.yaml"));
            paths.push(gatewire_dir.join("config.json"));
        }

        paths
    }

    /// Look up a route by name
    pub fn route(&self, name: &str) -> Result<&RouteConfig> {
        self.routes.get(name).ok_or_else(|| Error::RouteNotFound {
            name: name.to_string(),
        })
    }
}

/// Whether a path names a YAML document
pub fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("yaml") || s.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_config_with_routes_and_aliases() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r#"
logging:
  format: json
schemas_dir: ./schemas
routes:
  bedrock-claude:
    provider: amazon
    model: anthropic.claude-3-haiku
    stream_query: delta.text
model_aliases:
  "arn:aws:bedrock:us-east-1:1:inference-profile/x": meta.llama3-8b-instruct-v1:0
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.logging.format.as_deref(), Some("json"));
        assert_eq!(config.schemas_dir, Some(PathBuf::from("./schemas")));
        let route = config.route("bedrock-claude").unwrap();
        assert_eq!(route.provider.as_deref(), Some("amazon"));
        assert_eq!(route.stream_query(), "delta.text");
        assert_eq!(config.model_aliases.len(), 1);
        assert_eq!(config.output.format, "human");
    }

    #[test]
    fn test_json_config_defaults_missing_sections() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"routes": {{"chat": {{"provider": "openai"}}}}}}"#).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.route("chat").unwrap().stream_query(), DEFAULT_STREAM_QUERY);
        assert!(config.model_aliases.is_empty());
        assert!(matches!(config.route("missing"), Err(Error::RouteNotFound { .. })));
    }

    #[test]
    fn test_malformed_config_is_a_config_error() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(Config::from_file(file.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let err = Config::load_with_file(Some(Path::new("/nonexistent/gatewire.yaml"))).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
