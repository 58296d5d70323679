//! Declarative record transformation
//!
//! A rule set maps one untyped record onto another. Each rule reads a value
//! from the source record, optionally passes it through a named hook, reduces
//! sequences, coerces to a scalar type and writes it at a dotted target path.
//!
//! # Module Organization
//!
//! - [`types`] - array handling, type hints and per-rule errors
//! - [`resolve`] - source path lookup and target path writing
//! - [`coerce`] - array reduction and type coercion
//! - [`condition`] - discriminator predicates
//! - [`hooks`] - named post-processing hooks
//! - [`rule`] - declarative and compiled rules
//! - [`builder`] - fluent rule construction
//! - [`pipeline`] - the rule transformer
//!
//! # Example
//!
//! ```
//! use gatewire_core::transform::{transform, HookRegistry, TransformRuleBuilder, TypeHint};
//! use serde_json::json;
//!
//! let hooks = HookRegistry::builtin();
//! let rules = vec![
//!     TransformRuleBuilder::new("prompt", "inputText")
//!         .when("type == 'completion'")
//!         .build(&hooks)
//!         .unwrap(),
//!     TransformRuleBuilder::new("max_tokens", "textGenerationConfig.maxTokenCount")
//!         .default_value(50)
//!         .type_hint(TypeHint::Integer)
//!         .build(&hooks)
//!         .unwrap(),
//! ];
//!
//! let output = transform(&json!({"prompt": "Hello", "type": "completion"}), &rules);
//! assert_eq!(output, json!({
//!     "inputText": "Hello",
//!     "textGenerationConfig": {"maxTokenCount": 50}
//! }));
//! ```
//!
//! Copyright (c) 2025 Gatewire Team
//! Licensed under the Apache-2.0 license

pub mod builder;
pub mod coerce;
pub mod condition;
pub mod hooks;
pub mod pipeline;
pub mod resolve;
pub mod rule;
pub mod types;


pub use builder::TransformRuleBuilder;
pub use coerce::{coerce, reduce_array};
pub use condition::{Condition, DISCRIMINATOR};
pub use hooks::{Hook, HookFn, HookRegistry};
pub use pipeline::{transform, transform_with_report, TransformReport};
pub use resolve::{SourcePath, TargetPath};
pub use rule::{RuleDefinition, TransformRule};
pub use types::{ArrayHandling, TransformError, TypeHint};
