//! Error types for path-query compilation
//!
//! Copyright (c) 2025 Gatewire Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Errors raised while compiling a path-query expression.
///
/// Evaluation itself never fails; only malformed expressions are errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Generic parse failure at a byte position
    #[error("Parse error at position {position}: {message}")]
    Parse {
        message: String,
        position: usize,
        input: String,
    },

    /// An unexpected character where something specific was required
    #[error("Syntax error at position {position}: {message} (found '{found}')")]
    Syntax {
        message: String,
        position: usize,
        input: String,
        expected: Vec<String>,
        found: String,
    },
}

impl QueryError {
    /// Create a parse error with position and input
    pub fn parse(message: impl Into<String>, position: usize, input: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            position,
            input: input.into(),
        }
    }

    /// Create a syntax error with expected tokens
    pub fn syntax(
        message: impl Into<String>,
        position: usize,
        input: impl Into<String>,
        expected: Vec<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
            input: input.into(),
            expected,
            found: found.into(),
        }
    }

    /// Byte offset of the failure
    pub fn position(&self) -> usize {
        match self {
            Self::Parse { position, .. } | Self::Syntax { position, .. } => *position,
        }
    }

    /// The expression that failed to compile
    pub fn input(&self) -> &str {
        match self {
            Self::Parse { input, .. } | Self::Syntax { input, .. } => input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = QueryError::syntax("Expected ']'", 4, "a[0", vec!["]".to_string()], "EOF");
        assert_eq!(err.to_string(), "Syntax error at position 4: Expected ']' (found 'EOF')");
        assert_eq!(err.position(), 4);
        assert_eq!(err.input(), "a[0");
    }
}
