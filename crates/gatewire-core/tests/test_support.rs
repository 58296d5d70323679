//! Shared test support utilities for integration tests

#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use gatewire_core::{ModelAdapter, SchemaRegistry};
use serde_json::{json, Value};
use std::sync::Arc;

/// Registry with the built-in specs
pub fn builtin_registry() -> Arc<SchemaRegistry> {
    Arc::new(SchemaRegistry::builtin().expect("built-in specs compile"))
}

/// Adapter resolving through the built-in registry
pub fn registry_adapter() -> ModelAdapter {
    ModelAdapter::with_registry(builtin_registry())
}

/// Canonical completion request
pub fn completion_record(prompt: &str) -> Value {
    json!({"prompt": prompt, "max_tokens": 50, "temperature": 0.7, "type": "completion"})
}

/// Canonical chat request with a system and a user message
pub fn chat_record(system: &str, user: &str) -> Value {
    json!({
        "type": "chat",
        "messages": [
            {"role": "system", "content": system},
            {"role": "user", "content": user}
        ]
    })
}

/// One SSE chat delta line
pub fn sse_delta(content: &str) -> String {
    format!("data: {}", json!({"choices": [{"delta": {"content": content}}]}))
}

/// One event-stream frame carrying `payload` base64 encoded, with binary
/// prelude and trailing CRC bytes rendered as text
pub fn event_stream_frame(payload: &Value) -> String {
    let body = json!({"bytes": STANDARD.encode(payload.to_string()), "p": "abcdefghij"});
    format!(
        "\u{0}\u{0}\u{1}\u{b}\u{0}\u{0}\u{0}K:event-type\u{7}\u{0}\u{5}chunk\r:content-type\u{7}\u{0}\u{10}application/json\r:message-type\u{7}\u{0}\u{5}event{}\u{1f}\u{7f}",
        body
    )
}
