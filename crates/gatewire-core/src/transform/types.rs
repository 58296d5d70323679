//! Core types for the rule transformer
//!
//! Copyright (c) 2025 Gatewire Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while applying a single rule.
///
/// These never escape [`transform`](super::transform): the offending rule is
/// logged and dropped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Type conversion failed
    #[error("Type conversion failed: cannot convert {from} to {to} for value: {value}")]
    TypeConversion {
        from: String,
        to: String,
        value: String,
    },

    /// A named hook rejected its input
    #[error("Hook '{hook}' failed: {message}")]
    Hook { hook: String, message: String },

    /// The output could not be written at the target path
    #[error("Cannot write target path '{path}': {message}")]
    TargetPath { path: String, message: String },
}

impl TransformError {
    pub(crate) fn conversion(from: &str, to: TypeHint, value: &serde_json::Value) -> Self {
        Self::TypeConversion {
            from: from.to_string(),
            to: to.to_string(),
            value: value.to_string(),
        }
    }

    /// Create a hook failure
    pub fn hook(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Hook {
            hook: hook.into(),
            message: message.into(),
        }
    }
}

/// How a sequence value collapses into a scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayHandling {
    /// Space-separated string of the non-null elements
    Join,
    /// First element, absent when empty
    First,
    /// Last element, absent when empty
    Last,
    /// Concatenate nested sequences one level deep
    Flatten,
}

/// Scalar type a value is coerced to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeHint {
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "int", alias = "integer")]
    Integer,
    #[serde(rename = "bool", alias = "boolean")]
    Boolean,
    #[serde(rename = "str", alias = "string")]
    String,
}

impl fmt::Display for ArrayHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayHandling::Join => write!(f, "join"),
            ArrayHandling::First => write!(f, "first"),
            ArrayHandling::Last => write!(f, "last"),
            ArrayHandling::Flatten => write!(f, "flatten"),
        }
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeHint::Float => write!(f, "float"),
            TypeHint::Integer => write!(f, "int"),
            TypeHint::Boolean => write!(f, "bool"),
            TypeHint::String => write!(f, "str"),
        }
    }
}
