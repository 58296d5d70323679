//! Shared utilities for command handlers

use crate::cli::{OutputFormat, TargetArgs};
use crate::config::{is_yaml, Config};
use crate::error::{Error, Result};
use crate::output::OutputFormatter;
use gatewire_core::schema::normalize_provider;
use gatewire_core::{HookRegistry, ModelFamily, ModelIdCache, SchemaRegistry, StaticResolver};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read a JSON or YAML document
pub fn read_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;

    if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|_| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "YAML".to_string(),
        })
    } else {
        serde_json::from_str(&content).map_err(|_| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON".to_string(),
        })
    }
}

/// Write a value to a file, YAML when the extension says so
pub fn save_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let format = if is_yaml(path) {
        OutputFormat::Yaml
    } else {
        OutputFormat::JsonPretty
    };
    fs::write(path, format.format(value)?)?;
    Ok(())
}

/// Registry with the built-in specs plus any definitions under `schemas_dir`
pub fn load_registry(config: &Config) -> Result<SchemaRegistry> {
    let hooks = HookRegistry::builtin();
    let mut registry = SchemaRegistry::with_builtins(&hooks)?;

    if let Some(dir) = &config.schemas_dir {
        let loaded = registry.load_path(dir, &hooks)?;
        tracing::info!(dir = %dir.display(), loaded, "Loaded model specs");
    }

    Ok(registry)
}

/// Provider and model a command operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub provider: String,
    /// Model name after alias resolution
    pub model: String,
    /// Model key used for the registry lookup
    pub schema_key: String,
}

impl Target {
    /// Resolve flags and the optional route into a concrete target
    ///
    /// Flags win over route values. Model identifiers pass through the
    /// configured aliases; providers that register specs per model family
    /// are looked up by the detected family key.
    pub fn resolve(args: &TargetArgs, config: &Config, registry: &SchemaRegistry) -> Result<Self> {
        let route = args.route.as_deref().map(|name| config.route(name)).transpose()?;

        let provider = args
            .provider
            .clone()
            .or_else(|| route.and_then(|r| r.provider.clone()))
            .ok_or_else(|| Error::invalid_args("a provider is required (--provider or --route)"))?;
        let model_id = args
            .model
            .clone()
            .or_else(|| route.and_then(|r| r.model.clone()))
            .ok_or_else(|| Error::invalid_args("a model is required (--model or --route)"))?;

        let cache = ModelIdCache::new(StaticResolver::new(config.model_aliases.clone()));
        let model = cache.resolve(&model_id)?;

        let family = ModelFamily::detect(args.route.as_deref(), &model);
        let provider_key = normalize_provider(&provider);
        let family_registered = family != ModelFamily::Default
            && registry
                .entries()
                .iter()
                .any(|&(p, m)| p == provider_key && m == family.registry_key());
        let schema_key = if family_registered {
            family.registry_key().to_string()
        } else {
            model.clone()
        };

        tracing::debug!(%provider, %model_id, %model, %schema_key, "Resolved target");
        Ok(Self {
            provider,
            model,
            schema_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;
    use std::io::Write;

    fn target_args(provider: Option<&str>, model: Option<&str>, route: Option<&str>) -> TargetArgs {
        TargetArgs {
            provider: provider.map(str::to_string),
            model: model.map(str::to_string),
            route: route.map(str::to_string),
        }
    }

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builtin().unwrap()
    }

    #[test]
    fn test_bedrock_model_id_maps_to_family_key() {
        let args = target_args(Some("amazon"), Some("meta.llama3-8b-instruct-v1:0"), None);
        let target = Target::resolve(&args, &Config::default(), &registry()).unwrap();
        assert_eq!(target.model, "meta.llama3-8b-instruct-v1:0");
        assert_eq!(target.schema_key, "llama");
    }

    #[test]
    fn test_openai_model_keeps_its_name() {
        let args = target_args(Some("openai"), Some("gpt-4o-mini"), None);
        let target = Target::resolve(&args, &Config::default(), &registry()).unwrap();
        assert_eq!(target.schema_key, "gpt-4o-mini");
    }

    #[test]
    fn test_route_supplies_missing_values_and_aliases_apply() {
        let mut config = Config::default();
        config.routes.insert(
            "bedrock".to_string(),
            RouteConfig {
                provider: Some("amazon".to_string()),
                model: Some("profile-123".to_string()),
                stream_query: None,
            },
        );
        config
            .model_aliases
            .insert("profile-123".to_string(), "amazon.titan-text-express-v1".to_string());

        let args = target_args(None, None, Some("bedrock"));
        let target = Target::resolve(&args, &config, &registry()).unwrap();
        assert_eq!(target.provider, "amazon");
        assert_eq!(target.model, "amazon.titan-text-express-v1");
        assert_eq!(target.schema_key, "titan");

        let args = target_args(None, Some("gpt-4o"), Some("bedrock"));
        assert_eq!(Target::resolve(&args, &config, &registry()).unwrap().model, "gpt-4o");
    }

    #[test]
    fn test_missing_provider_is_invalid_args() {
        let args = target_args(None, Some("gpt-4o"), None);
        let err = Target::resolve(&args, &Config::default(), &registry()).unwrap_err();
        assert!(err.should_show_help());

        let args = target_args(Some("openai"), None, Some("nope"));
        let err = Target::resolve(&args, &Config::default(), &registry()).unwrap_err();
        assert!(matches!(err, Error::RouteNotFound { .. }));
    }

    #[test]
    fn test_read_document_formats() {
        let mut yaml = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(yaml, "type: completion\nprompt: Hello").unwrap();
        assert_eq!(
            read_document(yaml.path()).unwrap(),
            serde_json::json!({"type": "completion", "prompt": "Hello"})
        );

        let mut bad = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(bad, "prompt: Hello").unwrap();
        assert!(matches!(read_document(bad.path()), Err(Error::InvalidFormat { .. })));
    }
}
