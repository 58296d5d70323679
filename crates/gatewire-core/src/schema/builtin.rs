//! Built-in provider specs
//!
//! OpenAI-compatible providers pass canonical fields through. Amazon Bedrock
//! models are keyed by family (`llama`, `titan`); [`ModelFamily::detect`]
//! maps a route or concrete model id onto that key.

use super::registry::{SchemaRegistry, WILDCARD_MODEL};
use super::ModelSpec;
use crate::transform::{ArrayHandling, HookRegistry, RuleDefinition, TransformRuleBuilder, TypeHint};
use crate::Result;

const CHAT: &str = "type == 'chat'";
const COMPLETION: &str = "type == 'completion'";

/// Model family used as the registry model key for family-keyed providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Llama,
    Titan,
    /// Anything else; resolves through the wildcard entry
    Default,
}

impl ModelFamily {
    /// Detect the family from a route name or model id, route first
    pub fn detect(route: Option<&str>, model: &str) -> Self {
        [route.unwrap_or_default(), model]
            .iter()
            .map(|name| name.to_lowercase())
            .find_map(|name| {
                if name.contains("llama") {
                    Some(ModelFamily::Llama)
                } else if name.contains("titan") {
                    Some(ModelFamily::Titan)
                } else {
                    None
                }
            })
            .unwrap_or(ModelFamily::Default)
    }

    /// The registry model key for this family
    pub fn registry_key(&self) -> &'static str {
        match self {
            ModelFamily::Llama => "llama",
            ModelFamily::Titan => "titan",
            ModelFamily::Default => WILDCARD_MODEL,
        }
    }
}

fn rule(source: &str, target: &str) -> TransformRuleBuilder {
    TransformRuleBuilder::new(source, target)
}

/// OpenAI-compatible pass-through request rules
pub fn openai_input() -> Vec<RuleDefinition> {
    vec![
        rule("messages", "messages").when(CHAT).definition(),
        rule("prompt", "prompt").when(COMPLETION).definition(),
        rule("temperature", "temperature")
            .default_value(0.7)
            .type_hint(TypeHint::Float)
            .definition(),
        rule("max_tokens", "max_tokens")
            .type_hint(TypeHint::Integer)
            .definition(),
    ]
}

pub fn openai_output() -> Vec<RuleDefinition> {
    vec![
        rule("choices[0].message.content", "choices[0].message.content")
            .default_value("")
            .definition(),
        rule("choices[0].finish_reason", "choices[0].finish_reason")
            .default_value("stop")
            .definition(),
        usage("usage.prompt_tokens", "usage.prompt_tokens"),
        usage("usage.completion_tokens", "usage.completion_tokens"),
    ]
}

/// Bedrock Llama request rules
pub fn llama_input() -> Vec<RuleDefinition> {
    vec![
        rule("messages[*].content", "prompt")
            .when(CHAT)
            .array_handling(ArrayHandling::Join)
            .definition(),
        rule("prompt", "prompt").when(COMPLETION).definition(),
        rule("temperature", "temperature")
            .default_value(0.7)
            .type_hint(TypeHint::Float)
            .definition(),
        rule("max_tokens", "max_gen_len")
            .default_value(50)
            .type_hint(TypeHint::Integer)
            .definition(),
        rule("top_p", "top_p")
            .default_value(0.9)
            .type_hint(TypeHint::Float)
            .definition(),
    ]
}

pub fn llama_output() -> Vec<RuleDefinition> {
    vec![
        rule("generation", "choices[0].message.content")
            .default_value("")
            .definition(),
        rule("stop_reason", "choices[0].finish_reason").definition(),
        usage("prompt_token_count", "usage.prompt_tokens"),
        usage("generation_token_count", "usage.completion_tokens"),
    ]
}

/// Bedrock Titan request rules
pub fn titan_input() -> Vec<RuleDefinition> {
    vec![
        rule("messages", "inputText")
            .when(CHAT)
            .hook("format_messages")
            .definition(),
        rule("prompt", "inputText").when(COMPLETION).definition(),
        rule("temperature", "textGenerationConfig.temperature")
            .default_value(0.7)
            .type_hint(TypeHint::Float)
            .definition(),
        rule("max_tokens", "textGenerationConfig.maxTokenCount")
            .default_value(50)
            .type_hint(TypeHint::Integer)
            .definition(),
    ]
}

pub fn titan_output() -> Vec<RuleDefinition> {
    vec![
        rule("results[*].outputText", "choices[0].message.content")
            .default_value("")
            .array_handling(ArrayHandling::First)
            .definition(),
        rule("results[0].completionReason", "choices[0].finish_reason").definition(),
        usage("inputTextTokenCount", "usage.prompt_tokens"),
        usage("results[0].tokenCount", "usage.completion_tokens"),
    ]
}

fn usage(source: &str, target: &str) -> RuleDefinition {
    rule(source, target)
        .default_value(0)
        .type_hint(TypeHint::Integer)
        .definition()
}

/// Compile and register every built-in spec
pub fn register_builtins(registry: &mut SchemaRegistry, hooks: &HookRegistry) -> Result<()> {
    let openai = ModelSpec::compile(&openai_input(), &openai_output(), hooks)?;
    registry.register("openai", WILDCARD_MODEL, openai.clone());
    registry.register("azureopenai", WILDCARD_MODEL, openai);

    registry.register(
        "amazon",
        ModelFamily::Llama.registry_key(),
        ModelSpec::compile(&llama_input(), &llama_output(), hooks)?,
    );
    registry.register(
        "amazon",
        ModelFamily::Titan.registry_key(),
        ModelSpec::compile(&titan_input(), &titan_output(), hooks)?,
    );
    Ok(())
}
