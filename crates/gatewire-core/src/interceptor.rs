//! Client interception
//!
//! Provider clients are wrapped, never patched. Anything that can turn a
//! request record into a response record implements [`Invoke`];
//! [`AdaptedClient`] composes a [`ModelAdapter`] around such a client so the
//! caller speaks canonical records only.

use crate::adapter::{ChatCompletion, ModelAdapter};
use crate::request::CanonicalRequest;
use crate::Result;
use serde_json::Value;
use tracing::instrument;

/// One request in, one response out
pub trait Invoke {
    fn invoke(&self, request: &Value) -> Result<Value>;
}

impl<T: Invoke + ?Sized> Invoke for &T {
    fn invoke(&self, request: &Value) -> Result<Value> {
        (**self).invoke(request)
    }
}

impl<T: Invoke + ?Sized> Invoke for Box<T> {
    fn invoke(&self, request: &Value) -> Result<Value> {
        (**self).invoke(request)
    }
}

/// An inner client speaking one provider's wire format, wrapped to accept
/// canonical requests and return canonical responses
#[derive(Debug, Clone)]
pub struct AdaptedClient<C> {
    inner: C,
    adapter: ModelAdapter,
    provider: String,
    model: String,
}

impl<C: Invoke> AdaptedClient<C> {
    pub fn new(
        inner: C,
        adapter: ModelAdapter,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            adapter,
            provider: provider.into(),
            model: model.into(),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Prepare, invoke and parse one canonical request
    pub fn complete(&self, request: CanonicalRequest) -> Result<ChatCompletion> {
        self.complete_record(&request.into_record())
    }

    #[instrument(level = "debug", skip_all, fields(provider = %self.provider, model = %self.model))]
    fn complete_record(&self, record: &Value) -> Result<ChatCompletion> {
        let wire_request = self
            .adapter
            .prepare_request(&self.provider, &self.model, record)?;
        let wire_response = self.inner.invoke(&wire_request)?;
        self.adapter
            .parse_response(&self.provider, &self.model, &wire_response)
    }
}

impl<C: Invoke> Invoke for AdaptedClient<C> {
    /// Canonical record in, canonical envelope out
    fn invoke(&self, request: &Value) -> Result<Value> {
        self.complete_record(request)?.to_value()
    }
}
