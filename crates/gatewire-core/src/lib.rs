//! Gatewire Core - provider schema normalization for LLM gateways
//!
//! This crate converts one canonical request shape into provider-specific wire
//! requests, converts provider responses back into one canonical envelope and
//! extracts text fragments from streaming responses.
//!
//! # Main Components
//!
//! - **Path Queries**: compiled JMESPath-style expressions over JSON records
//! - **Rule Transformer**: declarative, partial-failure tolerant field mapping
//! - **Schema Registry**: (provider, model) to input/output rule sets
//! - **Model Adapter**: `prepare_request` and `parse_response`
//! - **Streaming**: SSE, event-stream and delta-JSON text extraction
//!
//! # Example
//!
//! ```
//! use gatewire_core::{ModelAdapter, Result, SchemaRegistry};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! fn example() -> Result<()> {
//!     let registry = Arc::new(SchemaRegistry::builtin()?);
//!     let adapter = ModelAdapter::with_registry(registry);
//!
//!     let request = json!({"prompt": "Hello", "max_tokens": 50, "temperature": 0.7, "type": "completion"});
//!     let wire = adapter.prepare_request("amazon", "titan", &request)?;
//!     assert_eq!(wire, json!({
//!         "inputText": "Hello",
//!         "textGenerationConfig": {"maxTokenCount": 50, "temperature": 0.7}
//!     }));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod adapter;
pub mod error;
pub mod interceptor;
pub mod model_id;
pub mod query;
pub mod request;
pub mod schema;
pub mod streaming;
pub mod transform;

// Re-export main types for convenience
pub use adapter::{ChatCompletion, Choice, ChoiceMessage, ModelAdapter, Usage};
pub use error::{Error, Result};
pub use interceptor::{AdaptedClient, Invoke};
pub use model_id::{ModelIdCache, ModelResolver, StaticResolver};
pub use query::{search, PathQuery, QueryError};
pub use request::{CanonicalRequest, Message, RequestKind};
pub use schema::{ModelFamily, ModelSpec, ModelSpecDefinition, SchemaRegistry};
pub use streaming::{LineOutcome, StreamFraming, StreamLineProcessor, TextFragments};
pub use transform::{
    transform, ArrayHandling, HookRegistry, RuleDefinition, TransformRule, TransformRuleBuilder,
    TypeHint,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
