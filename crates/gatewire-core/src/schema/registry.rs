//! Schema registry keyed by provider and model

use super::{builtin, ModelSpec};
use crate::transform::{HookRegistry, TransformRule};
use crate::{Error, Result};
use std::collections::HashMap;

/// Model key matching any model of a provider
pub const WILDCARD_MODEL: &str = "*";

/// Lower-case a provider name and strip all whitespace
pub fn normalize_provider(provider: &str) -> String {
    provider
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Maps (provider, model) to a [`ModelSpec`].
///
/// Provider names are normalized on both registration and lookup. Model names
/// match exactly, falling back to the provider's `*` entry.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    specs: HashMap<String, HashMap<String, ModelSpec>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in provider specs
    pub fn builtin() -> Result<Self> {
        Self::with_builtins(&HookRegistry::builtin())
    }

    /// Built-in provider specs compiled against a custom hook registry
    pub fn with_builtins(hooks: &HookRegistry) -> Result<Self> {
        let mut registry = Self::new();
        builtin::register_builtins(&mut registry, hooks)?;
        Ok(registry)
    }

    /// Register a spec, replacing any existing spec for the same key
    pub fn register(&mut self, provider: &str, model: impl Into<String>, spec: ModelSpec) -> &mut Self {
        let model = model.into();
        log::debug!("Registering model spec {}/{}", normalize_provider(provider), model);
        self.specs
            .entry(normalize_provider(provider))
            .or_default()
            .insert(model, spec);
        self
    }

    /// Look up the spec for a provider/model pair
    pub fn get(&self, provider: &str, model: &str) -> Result<&ModelSpec> {
        let key = normalize_provider(provider);
        let models = self
            .specs
            .get(&key)
            .ok_or_else(|| Error::unsupported_provider(provider))?;

        models
            .get(model)
            .or_else(|| models.get(WILDCARD_MODEL))
            .ok_or_else(|| Error::unsupported_model(provider, model))
    }

    /// Input rules for a provider/model pair
    pub fn get_input_schema(&self, provider: &str, model: &str) -> Result<&[TransformRule]> {
        Ok(self.get(provider, model)?.input_rules())
    }

    /// Output rules for a provider/model pair
    pub fn get_output_schema(&self, provider: &str, model: &str) -> Result<&[TransformRule]> {
        Ok(self.get(provider, model)?.output_rules())
    }

    pub fn contains(&self, provider: &str, model: &str) -> bool {
        self.get(provider, model).is_ok()
    }

    /// All registered (provider, model) keys, sorted
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .specs
            .iter()
            .flat_map(|(provider, models)| {
                models.keys().map(move |model| (provider.as_str(), model.as_str()))
            })
            .collect();
        entries.sort_unstable();
        entries
    }

    pub fn len(&self) -> usize {
        self.specs.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::TransformRuleBuilder;

    fn spec_with_target(target: &str) -> ModelSpec {
        let rule = TransformRuleBuilder::new("prompt", target)
            .build(&HookRegistry::new())
            .unwrap();
        ModelSpec::new(vec![rule], Vec::new())
    }

    #[test]
    fn test_normalize_provider() {
        assert_eq!(normalize_provider(" Azure OpenAI "), "azureopenai");
        assert_eq!(normalize_provider("Amazon"), "amazon");
    }

    #[test]
    fn test_exact_then_wildcard() {
        let mut registry = SchemaRegistry::new();
        registry.register("acme", "*", spec_with_target("wild"));
        registry.register("acme", "exact-1", spec_with_target("exact"));

        let exact = registry.get_input_schema("ACME", "exact-1").unwrap();
        assert_eq!(exact[0].target().as_str(), "exact");
        let wild = registry.get_input_schema("acme", "other").unwrap();
        assert_eq!(wild[0].target().as_str(), "wild");
    }

    #[test]
    fn test_model_matched_exactly() {
        let mut registry = SchemaRegistry::new();
        registry.register("acme", "Model-A", spec_with_target("a"));
        assert!(registry.contains("acme", "Model-A"));
        assert!(!registry.contains("acme", "model-a"));
    }

    #[test]
    fn test_unknown_provider_message() {
        let registry = SchemaRegistry::new();
        let err = registry.get_input_schema("nowhere", "x").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported provider: nowhere");
        assert!(err.is_terminal());
    }

    #[test]
    fn test_unknown_model_without_wildcard() {
        let mut registry = SchemaRegistry::new();
        registry.register("acme", "only", spec_with_target("a"));
        let err = registry.get_output_schema("acme", "other").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported model for provider acme: other");
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = SchemaRegistry::new();
        registry.register("acme", "*", spec_with_target("old"));
        registry.register("Acme", "*", spec_with_target("new"));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get_input_schema("acme", "x").unwrap()[0].target().as_str(),
            "new"
        );
    }

    #[test]
    fn test_entries_sorted() {
        let registry = SchemaRegistry::builtin().unwrap();
        assert_eq!(
            registry.entries(),
            vec![
                ("amazon", "llama"),
                ("amazon", "titan"),
                ("azureopenai", "*"),
                ("openai", "*")
            ]
        );
    }
}
