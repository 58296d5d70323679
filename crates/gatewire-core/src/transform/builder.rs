//! Builder for creating transform rules
//!
//! Fluent construction of [`RuleDefinition`]s, compiled on `build`.
//!
//! Copyright (c) 2025 Gatewire Team
//! Licensed under the Apache-2.0 license

use super::hooks::HookRegistry;
use super::rule::{RuleDefinition, TransformRule};
use super::types::{ArrayHandling, TypeHint};
use crate::Result;
use serde_json::Value;

/// Builder for creating transform rules
#[derive(Debug, Clone)]
pub struct TransformRuleBuilder {
    definition: RuleDefinition,
}

impl TransformRuleBuilder {
    /// Create a new rule builder mapping `source_path` to `target_path`
    pub fn new(source_path: impl Into<String>, target_path: impl Into<String>) -> Self {
        Self {
            definition: RuleDefinition {
                source_path: source_path.into(),
                target_path: target_path.into(),
                conditions: Vec::new(),
                default_value: None,
                transform_function: None,
                array_handling: None,
                type_hint: None,
            },
        }
    }

    /// Add a condition predicate; all conditions must hold
    pub fn when(mut self, predicate: impl Into<String>) -> Self {
        self.definition.conditions.push(predicate.into());
        self
    }

    /// Value used when the source path resolves to nothing
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.definition.default_value = Some(value.into());
        self
    }

    /// Named post-processing hook
    pub fn hook(mut self, name: impl Into<String>) -> Self {
        self.definition.transform_function = Some(name.into());
        self
    }

    /// Set the array handling strategy
    pub fn array_handling(mut self, handling: ArrayHandling) -> Self {
        self.definition.array_handling = Some(handling);
        self
    }

    /// Set the type hint
    pub fn type_hint(mut self, hint: TypeHint) -> Self {
        self.definition.type_hint = Some(hint);
        self
    }

    /// The definition built so far
    pub fn definition(self) -> RuleDefinition {
        self.definition
    }

    /// Build the transform rule
    pub fn build(self, hooks: &HookRegistry) -> Result<TransformRule> {
        self.definition.compile(hooks)
    }
}
