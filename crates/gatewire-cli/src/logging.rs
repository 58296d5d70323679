//! Logging utilities for the Gatewire CLI
//!
//! This module provides:
//! - Session request ID generation
//! - Sensitive data redaction
//! - Performance timing spans
//! - Subscriber setup in compact, full or JSON format

use crate::config::LoggingSettings;
use crate::error::{Error, Result};
use is_terminal::IsTerminal;
use std::sync::OnceLock;
use tracing::{field, Span};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Global request ID for the current session
static REQUEST_ID: OnceLock<String> = OnceLock::new();

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Output format: compact, full, json
    pub format: LogFormat,
    /// Enable ANSI console output
    pub console: bool,
    /// Include thread IDs
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact format for production
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl LogFormat {
    /// Parse a format name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "full" => Some(Self::Full),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            console: true,
            thread_ids: false,
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Create logging config from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => {
                config.level = "warn".to_string();
            }
            1 => {
                config.level = "info".to_string();
            }
            2 => {
                config.level = "debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Full;
                config.source_location = true;
                config.thread_ids = true;
            }
        }

        config
    }

    /// Apply the configuration file's logging section
    ///
    /// The file level only applies when no verbosity flag was given.
    pub fn merge_with_settings(&mut self, settings: &LoggingSettings, verbosity: u8) {
        if verbosity == 0 {
            if let Some(level) = &settings.level {
                self.level = level.clone();
            }
        }
        if let Some(format) = settings.format.as_deref().and_then(LogFormat::parse) {
            self.format = format;
        }
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        // RUST_LOG takes precedence
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            self.level = rust_log;
        }

        if let Ok(format) = std::env::var("GATEWIRE_LOG_FORMAT") {
            match LogFormat::parse(&format) {
                Some(format) => self.format = format,
                None => eprintln!("Invalid log format: {}, using default", format),
            }
        }
    }
}

/// Initialize the global logging system
///
/// Records emitted through the `log` facade by gatewire-core are bridged
/// into the same subscriber.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.level, e)))?;
    let ansi = config.console && std::io::stderr().is_terminal();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(config.thread_ids)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let installed = match config.format {
        LogFormat::Compact => builder.with_ansi(ansi).compact().try_init(),
        LogFormat::Full => builder.with_ansi(ansi).try_init(),
        // JSON should not have ANSI codes
        LogFormat::Json => builder.with_ansi(false).json().try_init(),
    };
    installed.map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;

    let request_id = generate_request_id();
    REQUEST_ID.set(request_id.clone()).map_err(|_| {
        Error::other("Failed to set request ID - request tracking may not work correctly")
    })?;

    tracing::debug!(
        request_id = %request_id,
        config = ?config,
        "Logging system initialized"
    );

    Ok(())
}

/// Generate a unique request ID for this session
pub fn generate_request_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}

/// Get the current request ID
pub fn current_request_id() -> Option<&'static str> {
    REQUEST_ID.get().map(|s| s.as_str())
}

/// Create a span with request ID and timing
pub fn create_operation_span(operation: &str) -> Span {
    tracing::info_span!(
        "operation",
        operation = operation,
        request_id = current_request_id().unwrap_or("unknown"),
        duration_ms = field::Empty,
    )
}

/// Sensitive data redaction utilities
pub mod redaction {
    use regex::Regex;
    use serde_json::Value;
    use std::sync::OnceLock;

    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

    fn patterns() -> &'static [Regex] {
        PATTERNS.get_or_init(|| {
            [
                r#"(?i)(api[_-]?key|apikey)[=:\s]+['"]?([a-zA-Z0-9_-]{10,})['"]?"#,
                r#"(?i)(token|bearer)[=:\s]+['"]?([a-zA-Z0-9_.-]{10,})['"]?"#,
                r#"(?i)(password|passwd|pwd)[=:\s]+['"]?([^\s'"]{3,})['"]?"#,
            ]
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
        })
    }

    /// Redact sensitive information from a string
    pub fn redact_sensitive(input: &str) -> String {
        patterns().iter().fold(input.to_string(), |acc, regex| {
            regex.replace_all(&acc, "$1=***").into_owned()
        })
    }

    /// Redact sensitive information from JSON values
    pub fn redact_json_value(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    if is_sensitive_key(key) {
                        *val = Value::String("***".to_string());
                    } else {
                        redact_json_value(val);
                    }
                }
            }
            Value::Array(arr) => {
                for item in arr.iter_mut() {
                    redact_json_value(item);
                }
            }
            Value::String(s) => {
                *s = redact_sensitive(s);
            }
            _ => {}
        }
    }

    /// Redacted copy of a JSON value, rendered for a log line
    pub fn redacted(value: &Value) -> String {
        let mut copy = value.clone();
        redact_json_value(&mut copy);
        copy.to_string()
    }

    fn is_sensitive_key(key: &str) -> bool {
        let key_lower = key.to_lowercase();
        // token counters are not credentials
        if key_lower.ends_with("_tokens") || key_lower.ends_with("tokencount") {
            return false;
        }
        key_lower.contains("key")
            || key_lower.contains("token")
            || key_lower.contains("password")
            || key_lower.contains("passwd")
            || key_lower.contains("secret")
            || key_lower.contains("credential")
            || key_lower.contains("auth")
    }
}

/// Performance timing utilities
pub mod timing {
    use std::time::Instant;
    use tracing::Span;

    /// A timer that logs its duration when dropped
    pub struct Timer {
        start: Instant,
        span: Span,
        operation: String,
    }

    impl Timer {
        pub fn new(operation: &str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation),
                operation: operation.to_string(),
            }
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let duration = self.start.elapsed();
            self.span.record("duration_ms", duration.as_millis() as u64);

            tracing::debug!(
                operation = %self.operation,
                duration_ms = duration.as_millis() as u64,
                "Operation completed"
            );
        }
    }
}
