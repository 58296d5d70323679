//! Loading model specs from JSON or YAML files

use super::registry::{SchemaRegistry, WILDCARD_MODEL};
use super::ModelSpec;
use crate::transform::{HookRegistry, RuleDefinition};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Declarative model spec as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpecDefinition {
    pub provider: String,
    #[serde(default = "wildcard")]
    pub model: String,
    #[serde(default)]
    pub input_rules: Vec<RuleDefinition>,
    #[serde(default)]
    pub output_rules: Vec<RuleDefinition>,
}

fn wildcard() -> String {
    WILDCARD_MODEL.to_string()
}

impl ModelSpecDefinition {
    /// Compile the rule sets against `hooks`
    pub fn compile(&self, hooks: &HookRegistry) -> Result<ModelSpec> {
        ModelSpec::compile(&self.input_rules, &self.output_rules, hooks)
    }
}

/// A spec file holds one definition or a list of them
#[derive(Deserialize)]
#[serde(untagged)]
enum SpecFile {
    Many(Vec<ModelSpecDefinition>),
    One(ModelSpecDefinition),
}

/// Read the definitions in one file; the format follows the extension
pub fn load_spec_file(path: &Path) -> Result<Vec<ModelSpecDefinition>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
        message: format!("Failed to read model spec from {:?}", path),
        source: e,
    })?;

    let parsed: SpecFile = if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|e| Error::Yaml {
            message: format!("Failed to parse model spec from {:?}", path),
            source: e,
        })?
    } else {
        serde_json::from_str(&content).map_err(|e| Error::Json {
            message: format!("Failed to parse model spec from {:?}", path),
            source: e,
        })?
    };

    Ok(match parsed {
        SpecFile::Many(definitions) => definitions,
        SpecFile::One(definition) => vec![definition],
    })
}

/// Read every `.json`, `.yaml` and `.yml` file in a directory, in file name order
pub fn load_spec_dir(dir: &Path) -> Result<Vec<ModelSpecDefinition>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::Io {
        message: format!("Failed to read model spec directory {:?}", dir),
        source: e,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_spec_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut definitions = Vec::new();
    for path in paths {
        log::debug!("Loading model specs from {:?}", path);
        definitions.extend(load_spec_file(&path)?);
    }
    Ok(definitions)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn is_spec_file(path: &Path) -> bool {
    is_yaml(path) || path.extension().and_then(|e| e.to_str()) == Some("json")
}

impl SchemaRegistry {
    /// Compile and register definitions; later ones replace earlier ones
    pub fn register_definitions(
        &mut self,
        definitions: &[ModelSpecDefinition],
        hooks: &HookRegistry,
    ) -> Result<usize> {
        // nothing is registered unless every definition compiles
        let compiled = definitions
            .iter()
            .map(|definition| definition.compile(hooks).map(|spec| (definition, spec)))
            .collect::<Result<Vec<_>>>()?;
        for (definition, spec) in compiled {
            self.register(&definition.provider, definition.model.clone(), spec);
        }
        Ok(definitions.len())
    }

    /// Load a spec file or directory into the registry
    pub fn load_path(&mut self, path: &Path, hooks: &HookRegistry) -> Result<usize> {
        let definitions = if path.is_dir() {
            load_spec_dir(path)?
        } else {
            load_spec_file(path)?
        };
        self.register_definitions(&definitions, hooks)
    }
}
