//! Rule definitions and compiled rules
//!
//! A [`RuleDefinition`] is the declarative, serializable form of a rule as it
//! appears in schema files. [`RuleDefinition::compile`] turns it into an
//! immutable [`TransformRule`] with its conditions parsed, its hook resolved
//! and its paths compiled.

use super::condition::Condition;
use super::hooks::{Hook, HookRegistry};
use super::resolve::{SourcePath, TargetPath};
use super::types::{ArrayHandling, TypeHint};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serializable field-mapping rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub source_path: String,
    pub target_path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_handling: Option<ArrayHandling>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<TypeHint>,
}

impl RuleDefinition {
    /// Compile against a hook registry
    pub fn compile(&self, hooks: &HookRegistry) -> Result<TransformRule> {
        let conditions = self
            .conditions
            .iter()
            .map(|predicate| Condition::parse(predicate))
            .collect::<Result<Vec<_>>>()?;

        let hook = self
            .transform_function
            .as_deref()
            .map(|name| hooks.resolve(name))
            .transpose()?;

        Ok(TransformRule {
            source: SourcePath::compile(&self.source_path),
            target: TargetPath::parse(&self.target_path)?,
            conditions,
            default_value: self.default_value.clone().filter(|v| !v.is_null()),
            hook,
            array_handling: self.array_handling,
            type_hint: self.type_hint,
            definition: self.clone(),
        })
    }
}

/// A compiled, read-only rule
#[derive(Debug, Clone, PartialEq)]
pub struct TransformRule {
    pub(crate) source: SourcePath,
    pub(crate) target: TargetPath,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) default_value: Option<Value>,
    pub(crate) hook: Option<Hook>,
    pub(crate) array_handling: Option<ArrayHandling>,
    pub(crate) type_hint: Option<TypeHint>,
    definition: RuleDefinition,
}

impl TransformRule {
    pub fn source(&self) -> &SourcePath {
        &self.source
    }

    pub fn target(&self) -> &TargetPath {
        &self.target
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn hook(&self) -> Option<&Hook> {
        self.hook.as_ref()
    }

    pub fn array_handling(&self) -> Option<ArrayHandling> {
        self.array_handling
    }

    pub fn type_hint(&self) -> Option<TypeHint> {
        self.type_hint
    }

    /// The definition this rule was compiled from
    pub fn definition(&self) -> &RuleDefinition {
        &self.definition
    }

    /// Short `source -> target` label for log lines
    pub fn label(&self) -> String {
        format!("{} -> {}", self.source, self.target)
    }
}
