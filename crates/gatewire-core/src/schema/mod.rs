//! Model specifications and the schema registry
//!
//! A [`ModelSpec`] pairs the input rules (canonical request to provider
//! request) with the output rules (provider response to canonical fields) for
//! one provider/model pair. Specs are compiled once, registered in a
//! [`SchemaRegistry`] and read-only afterwards.

pub mod builtin;
pub mod loader;
pub mod registry;

pub use builtin::ModelFamily;
pub use loader::{load_spec_dir, load_spec_file, ModelSpecDefinition};
pub use registry::{normalize_provider, SchemaRegistry, WILDCARD_MODEL};

use crate::transform::{HookRegistry, RuleDefinition, TransformRule};
use crate::Result;

/// Paired input and output rule sets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSpec {
    input_rules: Vec<TransformRule>,
    output_rules: Vec<TransformRule>,
}

impl ModelSpec {
    pub fn new(input_rules: Vec<TransformRule>, output_rules: Vec<TransformRule>) -> Self {
        Self {
            input_rules,
            output_rules,
        }
    }

    /// Compile rule definitions against `hooks`
    pub fn compile(
        input: &[RuleDefinition],
        output: &[RuleDefinition],
        hooks: &HookRegistry,
    ) -> Result<Self> {
        let compile_all = |definitions: &[RuleDefinition]| {
            definitions
                .iter()
                .map(|d| d.compile(hooks))
                .collect::<Result<Vec<_>>>()
        };
        Ok(Self::new(compile_all(input)?, compile_all(output)?))
    }

    pub fn input_rules(&self) -> &[TransformRule] {
        &self.input_rules
    }

    pub fn output_rules(&self) -> &[TransformRule] {
        &self.output_rules
    }
}
