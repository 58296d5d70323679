//! Canonical request construction
//!
//! [`CanonicalRequest`] is a typed front door for building the untyped
//! canonical record that rule sets consume. Validation happens at
//! construction so a malformed transcript never reaches a provider.

use crate::transform::DISCRIMINATOR;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Temperature used when the caller sets none
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Request discriminator values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Chat,
    Completion,
    Embedding,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Chat => "chat",
            RequestKind::Completion => "completion",
            RequestKind::Embedding => "embedding",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// A validated canonical request
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRequest {
    kind: RequestKind,
    model: Option<String>,
    messages: Vec<Message>,
    prompt: Option<String>,
    input: Option<Value>,
    temperature: f64,
    max_tokens: Option<u64>,
    top_p: Option<f64>,
    extra: Map<String, Value>,
}

impl CanonicalRequest {
    fn empty(kind: RequestKind) -> Self {
        Self {
            kind,
            model: None,
            messages: Vec::new(),
            prompt: None,
            input: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            top_p: None,
            extra: Map::new(),
        }
    }

    /// A chat request; every message needs a role and content
    pub fn chat(messages: Vec<Message>) -> Result<Self> {
        if messages.is_empty() {
            return Err(Error::validation("messages", "at least one message is required"));
        }
        for (i, message) in messages.iter().enumerate() {
            if message.role.trim().is_empty() {
                return Err(Error::validation(format!("messages[{}].role", i), "role is required"));
            }
            if message.content.is_empty() {
                return Err(Error::validation(
                    format!("messages[{}].content", i),
                    "content is required",
                ));
            }
        }
        Ok(Self {
            messages,
            ..Self::empty(RequestKind::Chat)
        })
    }

    /// A completion request
    pub fn completion(prompt: impl Into<String>) -> Result<Self> {
        let prompt = prompt.into();
        if prompt.is_empty() {
            return Err(Error::validation("prompt", "prompt is required"));
        }
        Ok(Self {
            prompt: Some(prompt),
            ..Self::empty(RequestKind::Completion)
        })
    }

    /// An embedding request over a string or a list of strings
    pub fn embedding(input: impl Into<Value>) -> Result<Self> {
        let input = input.into();
        let valid = match &input {
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty() && items.iter().all(Value::is_string),
            _ => false,
        };
        if !valid {
            return Err(Error::validation("input", "expected a string or a list of strings"));
        }
        Ok(Self {
            input: Some(input),
            ..Self::empty(RequestKind::Embedding)
        })
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Extra provider-specific field; named fields take precedence
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// The untyped canonical record, discriminator included
    pub fn into_record(self) -> Value {
        let mut record = self.extra;
        record.insert(DISCRIMINATOR.to_string(), Value::from(self.kind.as_str()));
        if !self.messages.is_empty() {
            record.insert(
                "messages".to_string(),
                Value::Array(
                    self.messages
                        .into_iter()
                        .map(|m| serde_json::json!({"role": m.role, "content": m.content}))
                        .collect(),
                ),
            );
        }
        if let Some(prompt) = self.prompt {
            record.insert("prompt".to_string(), Value::from(prompt));
        }
        if let Some(input) = self.input {
            record.insert("input".to_string(), input);
        }
        if let Some(model) = self.model {
            record.insert("model".to_string(), Value::from(model));
        }
        record.insert("temperature".to_string(), Value::from(self.temperature));
        if let Some(max_tokens) = self.max_tokens {
            record.insert("max_tokens".to_string(), Value::from(max_tokens));
        }
        if let Some(top_p) = self.top_p {
            record.insert("top_p".to_string(), Value::from(top_p));
        }
        Value::Object(record)
    }
}
