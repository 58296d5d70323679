//! Rule transformer
//!
//! Applies an ordered list of compiled rules to one record and builds a new
//! record from scratch. Rules are independent: a rule that fails is logged and
//! its effect dropped, and later rules still run.
//!
//! Copyright (c) 2025 Gatewire Team
//! Licensed under the Apache-2.0 license

use super::coerce::{coerce, reduce_array};
use super::condition::all_match;
use super::rule::TransformRule;
use super::types::TransformError;
use serde_json::{Map, Value};

/// What happened to each rule during one transform
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformReport {
    /// Rules that wrote a value
    pub applied: Vec<String>,
    /// Rules whose conditions did not hold
    pub skipped: Vec<String>,
    /// Rules that resolved to nothing and wrote nothing
    pub absent: Vec<String>,
    /// Rules that failed, with the reason
    pub failed: Vec<(String, TransformError)>,
}

impl TransformReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

enum RuleOutcome {
    Applied,
    Skipped,
    Absent,
}

/// Map `record` through `rules`.
///
/// Top-level output keys holding null are dropped afterwards; nested nulls
/// are kept.
pub fn transform(record: &Value, rules: &[TransformRule]) -> Value {
    transform_with_report(record, rules).0
}

/// Like [`transform`], also reporting the fate of every rule
pub fn transform_with_report(record: &Value, rules: &[TransformRule]) -> (Value, TransformReport) {
    let mut output = Map::new();
    let mut report = TransformReport::default();

    for rule in rules {
        match apply_rule(rule, record, &mut output) {
            Ok(RuleOutcome::Applied) => report.applied.push(rule.label()),
            Ok(RuleOutcome::Skipped) => report.skipped.push(rule.label()),
            Ok(RuleOutcome::Absent) => report.absent.push(rule.label()),
            Err(e) => {
                log::warn!("Transform rule '{}' failed and was dropped: {}", rule.label(), e);
                report.failed.push((rule.label(), e));
            }
        }
    }

    output.retain(|_, value| !value.is_null());
    (Value::Object(output), report)
}

fn apply_rule(
    rule: &TransformRule,
    record: &Value,
    output: &mut Map<String, Value>,
) -> Result<RuleOutcome, TransformError> {
    if !all_match(&rule.conditions, record) {
        return Ok(RuleOutcome::Skipped);
    }

    let mut value = rule
        .source
        .resolve(record)
        .or_else(|| rule.default_value.clone());

    if let (Some(hook), Some(current)) = (&rule.hook, &value) {
        value = Some(hook.apply(current)?);
    }

    if let (Some(handling), Some(Value::Array(items))) = (rule.array_handling, &value) {
        value = reduce_array(items, handling);
    }

    if let (Some(hint), Some(current)) = (rule.type_hint, &value) {
        if !current.is_null() {
            value = Some(coerce(current, hint)?);
        }
    }

    match value {
        Some(value) if !value.is_null() => {
            rule.target.write(output, value)?;
            Ok(RuleOutcome::Applied)
        }
        _ => Ok(RuleOutcome::Absent),
    }
}
