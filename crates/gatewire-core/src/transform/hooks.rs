//! Named post-processing hooks
//!
//! Rules reference hooks by name. Names are resolved against a
//! [`HookRegistry`] when the rule is compiled, so an unknown name is a
//! load-time error.
//!
//! Copyright (c) 2025 Gatewire Team
//! Licensed under the Apache-2.0 license

use super::types::TransformError;
use crate::{Error, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;

/// Signature of a hook: one value in, one replacement value out
pub type HookFn = fn(&Value) -> std::result::Result<Value, TransformError>;

/// A resolved hook bound into a compiled rule
#[derive(Clone)]
pub struct Hook {
    name: String,
    func: HookFn,
}

impl Hook {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the hook
    pub fn apply(&self, value: &Value) -> std::result::Result<Value, TransformError> {
        (self.func)(value)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hook").field(&self.name).finish()
    }
}

impl PartialEq for Hook {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Registry mapping hook names to functions
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: HashMap<String, HookFn>,
}

impl HookRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in hooks
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("format_messages", format_messages);
        registry.register("format_claude_completion", prompt_to_user_messages);
        registry.register("format_mistral_completion", prompt_to_user_messages);
        registry
    }

    /// Register a hook, replacing any previous hook with the same name
    pub fn register(&mut self, name: impl Into<String>, func: HookFn) -> &mut Self {
        self.hooks.insert(name.into(), func);
        self
    }

    /// Look up a hook by name
    pub fn resolve(&self, name: &str) -> Result<Hook> {
        self.hooks
            .get(name)
            .map(|func| Hook {
                name: name.to_string(),
                func: *func,
            })
            .ok_or_else(|| Error::rule(format!("hook `{}`", name), "unknown transform function"))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    /// Registered hook names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.hooks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.names())
            .finish()
    }
}

/// Render a chat transcript as `System:`/`Human:`/`Assistant:` lines
pub fn format_messages(value: &Value) -> std::result::Result<Value, TransformError> {
    let messages = value
        .as_array()
        .ok_or_else(|| TransformError::hook("format_messages", "expected a sequence of messages"))?;

    let mut lines = Vec::with_capacity(messages.len());
    for message in messages {
        let role = message.get("role").and_then(Value::as_str).unwrap_or_default();
        let content = match message.get("content") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let label = match role {
            "system" => "System",
            "user" => "Human",
            "assistant" => "Assistant",
            _ => continue,
        };
        lines.push(format!("{}: {}", label, content));
    }

    Ok(Value::String(lines.join("\n")))
}

/// Wrap a completion prompt as a single user message
pub fn prompt_to_user_messages(value: &Value) -> std::result::Result<Value, TransformError> {
    match value {
        Value::String(prompt) => Ok(json!([{"role": "user", "content": prompt}])),
        _ => Err(TransformError::hook("prompt_to_user_messages", "expected a prompt string")),
    }
}
