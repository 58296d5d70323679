//! Error types for the Gatewire core library
//!
//! Errors surfaced to callers live here. Failures that are recovered inside
//! the engine (a single rule that cannot be applied, a stream line that does
//! not parse) use their own local types and never reach this enum.

use crate::query::QueryError;
use thiserror::Error;

/// Main error type for Gatewire operations
#[derive(Error, Debug)]
pub enum Error {
    /// No schema is registered for the requested provider/model pair
    #[error("{}", unsupported_message(provider, model.as_deref()))]
    UnsupportedSchema {
        provider: String,
        model: Option<String>,
    },

    /// A path-query expression could not be compiled
    #[error("Invalid path query: {0}")]
    Query(#[from] QueryError),

    /// A rule definition could not be compiled
    #[error("Invalid rule {rule}: {message}")]
    Rule { message: String, rule: String },

    /// Invalid canonical request input
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Model identifier resolution failed
    #[error("Failed to resolve model '{model}': {message}")]
    ModelResolution { model: String, message: String },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parsing errors
    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

fn unsupported_message(provider: &str, model: Option<&str>) -> String {
    match model {
        Some(model) => format!("Unsupported model for provider {}: {}", provider, model),
        None => format!("Unsupported provider: {}", provider),
    }
}

impl Error {
    /// Create an unsupported-provider error
    pub fn unsupported_provider(provider: impl Into<String>) -> Self {
        Self::UnsupportedSchema {
            provider: provider.into(),
            model: None,
        }
    }

    /// Create an unsupported-model error
    pub fn unsupported_model(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self::UnsupportedSchema {
            provider: provider.into(),
            model: Some(model.into()),
        }
    }

    /// Create a rule compilation error
    pub fn rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rule {
            message: message.into(),
            rule: rule.into(),
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether retrying the same call could succeed
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedSchema { .. } | Self::Rule { .. } | Self::Validation { .. } | Self::Query(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_provider_display() {
        let err = Error::unsupported_provider("cohere");
        assert_eq!(err.to_string(), "Unsupported provider: cohere");
        assert!(err.is_terminal());
    }

    #[test]
    fn test_unsupported_model_display() {
        let err = Error::unsupported_model("amazon", "jurassic");
        assert_eq!(err.to_string(), "Unsupported model for provider amazon: jurassic");
    }

    #[test]
    fn test_io_error_is_not_terminal() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert!(!err.is_terminal());
        assert!(err.to_string().contains("disk"));
    }
}
