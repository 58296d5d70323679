//! Model adapter: canonical requests in, canonical responses out
//!
//! An adapter holds its rule source explicitly. It is either the identity
//! adapter (no spec, records pass through), bound to one [`ModelSpec`], or
//! backed by a shared [`SchemaRegistry`] that is consulted per call.
//!
//! Copyright (c) 2025 Gatewire Team
//! Licensed under the Apache-2.0 license

use crate::schema::{normalize_provider, ModelSpec, SchemaRegistry};
use crate::transform::{transform, TransformRule};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Providers whose wire request carries the model name
const MODEL_IN_BODY: &[&str] = &["openai"];

#[derive(Debug, Clone)]
enum SpecSource {
    Identity,
    Fixed(Arc<ModelSpec>),
    Registry(Arc<SchemaRegistry>),
}

/// Converts canonical records to provider requests and provider responses to
/// the canonical envelope
#[derive(Debug, Clone)]
pub struct ModelAdapter {
    source: SpecSource,
}

impl ModelAdapter {
    /// Adapter without a spec: requests pass through unchanged
    pub fn identity() -> Self {
        Self {
            source: SpecSource::Identity,
        }
    }

    /// Adapter bound to one spec regardless of provider and model
    pub fn with_spec(spec: impl Into<Arc<ModelSpec>>) -> Self {
        Self {
            source: SpecSource::Fixed(spec.into()),
        }
    }

    /// Adapter resolving specs from a shared registry
    pub fn with_registry(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            source: SpecSource::Registry(registry),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.source, SpecSource::Identity)
    }

    fn rules<'a>(
        &'a self,
        provider: &str,
        model: &str,
        pick: fn(&ModelSpec) -> &[TransformRule],
    ) -> Result<Option<&'a [TransformRule]>> {
        match &self.source {
            SpecSource::Identity => Ok(None),
            SpecSource::Fixed(spec) => Ok(Some(pick(spec.as_ref()))),
            SpecSource::Registry(registry) => Ok(Some(pick(registry.get(provider, model)?))),
        }
    }

    /// Build the provider wire request from a canonical record
    #[instrument(level = "debug", skip(self, request), fields(identity = self.is_identity()))]
    pub fn prepare_request(&self, provider: &str, model: &str, request: &Value) -> Result<Value> {
        let rules = match self.rules(provider, model, ModelSpec::input_rules)? {
            Some(rules) => rules,
            None => return Ok(request.clone()),
        };

        let mut prepared = match transform(request, rules) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        strip_leftovers(&mut prepared);

        if MODEL_IN_BODY.contains(&normalize_provider(provider).as_str()) {
            prepared.insert("model".to_string(), Value::from(model));
        }

        log::debug!("Prepared {} request with {} field(s)", provider, prepared.len());
        Ok(Value::Object(prepared))
    }

    /// Normalize a provider response into the canonical envelope
    #[instrument(level = "debug", skip(self, raw), fields(identity = self.is_identity()))]
    pub fn parse_response(&self, provider: &str, model: &str, raw: &Value) -> Result<ChatCompletion> {
        let transformed = match self.rules(provider, model, ModelSpec::output_rules)? {
            Some(rules) => transform(raw, rules),
            None => raw.clone(),
        };
        Ok(ChatCompletion::from_fields(model, transformed))
    }
}

impl Default for ModelAdapter {
    fn default() -> Self {
        Self::identity()
    }
}

/// Drop top-level entries left null or as empty maps
fn strip_leftovers(prepared: &mut Map<String, Value>) {
    prepared.retain(|_, value| match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    });
}

/// Canonical chat completion envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
    /// Any other top-level fields the output rules produced
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub index: u64,
    pub message: ChoiceMessage,
    pub finish_reason: String,
    /// Upstream choice fields outside the envelope, e.g. `logprobs`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    pub role: String,
    /// `None` when upstream sent an explicit null, as tool-call replies do
    pub content: Option<String>,
    /// Upstream message fields such as `tool_calls`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Token usage; `total_tokens` is always the sum of the other two
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl Usage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    fn from_value(value: Option<&Value>) -> Self {
        let count = |key: &str| value.and_then(|u| u.get(key)).map(token_count).unwrap_or(0);
        Self::new(count("prompt_tokens"), count("completion_tokens"))
    }
}

impl ChatCompletion {
    /// Wrap transformed response fields in the envelope.
    ///
    /// `id`, `created` and `model` from the fields win over the synthesized
    /// values.
    pub fn from_fields(model: &str, fields: Value) -> Self {
        let mut fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let id = match fields.remove("id") {
            Some(Value::String(id)) => id,
            _ => format!("chatcmpl-{}", Uuid::new_v4().simple()),
        };
        let created = fields
            .remove("created")
            .and_then(|v| v.as_i64())
            .unwrap_or_else(|| chrono::Utc::now().timestamp());
        let model = match fields.remove("model") {
            Some(Value::String(m)) => m,
            _ => model.to_string(),
        };
        let choices = normalize_choices(fields.remove("choices"));
        let usage = Usage::from_value(fields.remove("usage").as_ref());
        fields.remove("object");

        Self {
            id,
            object: "chat.completion".to_string(),
            created,
            model,
            choices,
            usage,
            extra: fields,
        }
    }

    /// Content of the first choice
    pub fn text(&self) -> &str {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or_default()
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn normalize_choices(choices: Option<Value>) -> Vec<Choice> {
    let items = match choices {
        Some(Value::Array(items)) => items,
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(position, choice)| {
            let mut choice = match choice {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            let index = choice
                .remove("index")
                .and_then(|v| v.as_u64())
                .unwrap_or(position as u64);
            let finish_reason = match choice.remove("finish_reason") {
                Some(Value::String(reason)) => reason,
                _ => "stop".to_string(),
            };
            let message = match choice.remove("message") {
                Some(Value::Object(message)) => normalize_message(message),
                _ => ChoiceMessage {
                    role: "assistant".to_string(),
                    content: Some(
                        choice
                            .get("content")
                            .or_else(|| choice.get("text"))
                            .map(content_string)
                            .unwrap_or_default(),
                    ),
                    extra: Map::new(),
                },
            };

            Choice {
                index,
                message,
                finish_reason,
                extra: choice,
            }
        })
        .collect()
}

/// Keep an upstream message as-is, filling in a missing role
fn normalize_message(mut message: Map<String, Value>) -> ChoiceMessage {
    let role = match message.remove("role") {
        Some(Value::String(role)) => role,
        _ => "assistant".to_string(),
    };
    let content = match message.remove("content") {
        None | Some(Value::Null) => None,
        Some(value) => Some(content_string(&value)),
    };
    ChoiceMessage {
        role,
        content,
        extra: message,
    }
}

fn content_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn token_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry_adapter() -> ModelAdapter {
        ModelAdapter::with_registry(Arc::new(SchemaRegistry::builtin().unwrap()))
    }

    #[test]
    fn test_identity_prepare_is_unchanged() {
        let request = json!({
            "type": "chat",
            "model": "gpt-4o",
            "messages": [{"role": "user", "content": "Hi"}],
            "temperature": 0.7,
            "max_tokens": 10
        });
        let prepared = ModelAdapter::identity()
            .prepare_request("openai", "gpt-4o", &request)
            .unwrap();
        assert_eq!(prepared, request);
    }

    #[test]
    fn test_openai_prepare_adds_model() {
        let request = json!({"type": "chat", "messages": [{"role": "user", "content": "Hi"}], "max_tokens": "5"});
        let prepared = registry_adapter()
            .prepare_request("OpenAI", "gpt-4o-mini", &request)
            .unwrap();
        assert_eq!(
            prepared,
            json!({
                "messages": [{"role": "user", "content": "Hi"}],
                "temperature": 0.7,
                "max_tokens": 5,
                "model": "gpt-4o-mini"
            })
        );
    }

    #[test]
    fn test_unknown_provider_is_surfaced() {
        let err = registry_adapter()
            .prepare_request("nowhere", "m", &json!({}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported provider: nowhere");
    }

    #[test]
    fn test_strip_leftovers() {
        let mut map = json!({"a": null, "b": {}, "c": {"d": 1}, "e": []})
            .as_object()
            .cloned()
            .unwrap();
        strip_leftovers(&mut map);
        assert_eq!(Value::Object(map), json!({"c": {"d": 1}, "e": []}));
    }

    #[test]
    fn test_usage_total_recomputed() {
        let raw = json!({
            "choices": [{"finish_reason": "stop", "message": {"content": "hi"}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 99}
        });
        let completion = registry_adapter().parse_response("openai", "gpt-4o", &raw).unwrap();
        assert_eq!(completion.usage, Usage::new(3, 1));
        assert_eq!(completion.usage.total_tokens, 4);
        assert_eq!(completion.text(), "hi");
        assert_eq!(completion.choices[0].message.role, "assistant");
        assert_eq!(completion.object, "chat.completion");
        assert!(completion.id.starts_with("chatcmpl-"));
    }

    #[test]
    fn test_identity_parse_keeps_upstream_id() {
        let raw = json!({
            "id": "resp-1",
            "created": 1700000000,
            "choices": [{"index": 0, "message": {"role": "assistant", "content": null}}],
            "system_fingerprint": "fp"
        });
        let completion = ModelAdapter::identity().parse_response("openai", "gpt-4o", &raw).unwrap();
        assert_eq!(completion.id, "resp-1");
        assert_eq!(completion.created, 1700000000);
        assert_eq!(completion.model, "gpt-4o");
        assert_eq!(completion.text(), "");
        assert_eq!(completion.choices[0].message.content, None);
        assert_eq!(completion.choices[0].finish_reason, "stop");
        assert_eq!(completion.usage, Usage::default());
        assert_eq!(completion.extra.get("system_fingerprint"), Some(&json!("fp")));
    }

    #[test]
    fn test_llama_response() {
        let raw = json!({"generation": "Sure.", "prompt_token_count": 7, "generation_token_count": 2, "stop_reason": "stop"});
        let completion = registry_adapter().parse_response("amazon", "llama", &raw).unwrap();
        let value = completion.to_value().unwrap();
        assert_eq!(value["choices"][0]["message"]["content"], json!("Sure."));
        assert_eq!(value["usage"], json!({"prompt_tokens": 7, "completion_tokens": 2, "total_tokens": 9}));
    }

    #[test]
    fn test_empty_choices_stay_empty() {
        let adapter = ModelAdapter::identity();
        for raw in [json!({"choices": []}), json!({"id": "resp-2"})] {
            let completion = adapter.parse_response("openai", "gpt-4o", &raw).unwrap();
            assert!(completion.choices.is_empty());
            assert_eq!(completion.text(), "");
            assert_eq!(completion.to_value().unwrap()["choices"], json!([]));
        }
    }

    #[test]
    fn test_titan_empty_results_only_carry_rule_defaults() {
        // the content rule declares a default, so the choice comes from the rules
        let completion = registry_adapter()
            .parse_response("amazon", "titan", &json!({"results": []}))
            .unwrap();
        assert_eq!(completion.choices.len(), 1);
        assert_eq!(completion.choices[0].message.content.as_deref(), Some(""));
        assert!(completion.choices[0].extra.is_empty());
    }

    #[test]
    fn test_identity_parse_keeps_tool_calls() {
        let tool_calls = json!([{
            "id": "call_1",
            "type": "function",
            "function": {"name": "lookup", "arguments": "{\"q\":\"rust\"}"}
        }]);
        let raw = json!({
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": null, "tool_calls": tool_calls, "refusal": null},
                "logprobs": null,
                "finish_reason": "tool_calls"
            }]
        });
        let completion = ModelAdapter::identity().parse_response("openai", "gpt-4o", &raw).unwrap();
        let choice = &completion.choices[0];
        assert_eq!(choice.finish_reason, "tool_calls");
        assert_eq!(choice.message.extra.get("tool_calls"), Some(&tool_calls));
        assert_eq!(choice.extra.get("logprobs"), Some(&Value::Null));

        let value = completion.to_value().unwrap();
        assert_eq!(
            value["choices"][0],
            json!({
                "index": 0,
                "message": {"role": "assistant", "content": null, "tool_calls": tool_calls, "refusal": null},
                "logprobs": null,
                "finish_reason": "tool_calls"
            })
        );
    }

    #[test]
    fn test_choice_without_message_uses_text() {
        let raw = json!({"choices": [{"text": "plain", "finish_reason": "length"}]});
        let completion = ModelAdapter::identity().parse_response("openai", "m", &raw).unwrap();
        assert_eq!(completion.text(), "plain");
        assert_eq!(completion.choices[0].finish_reason, "length");
        assert_eq!(completion.choices[0].extra.get("text"), Some(&json!("plain")));
    }

    #[test]
    fn test_token_count_tolerates_strings() {
        assert_eq!(token_count(&json!("12")), 12);
        assert_eq!(token_count(&json!(3.9)), 3);
        assert_eq!(token_count(&json!(-1)), 0);
        assert_eq!(token_count(&json!(null)), 0);
    }
}
