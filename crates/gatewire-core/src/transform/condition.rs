//! Rule conditions over the request discriminator
//!
//! Predicates are parsed once when a rule is compiled. Accepted forms:
//! `type == 'chat'`, `== 'chat'`, `type != 'embedding'` and
//! `type in ['chat', 'completion']`.

use crate::{Error, Result};
use serde_json::Value;

/// Record key that conditions are evaluated against
pub const DISCRIMINATOR: &str = "type";

/// Discriminator spellings that denote the same request kind
const KIND_ALIASES: &[(&str, &str)] = &[("completions", "completion")];

/// A typed comparison against the discriminator value
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Equals(String),
    NotEquals(String),
    OneOf(Vec<String>),
}

impl Condition {
    /// Parse a predicate string
    pub fn parse(predicate: &str) -> Result<Self> {
        let trimmed = predicate.trim();
        let rest = trimmed
            .strip_prefix(DISCRIMINATOR)
            .map(str::trim_start)
            .unwrap_or(trimmed);

        if let Some(literal) = rest.strip_prefix("==") {
            return Ok(Condition::Equals(parse_literal(literal, predicate)?));
        }
        if let Some(literal) = rest.strip_prefix("!=") {
            return Ok(Condition::NotEquals(parse_literal(literal, predicate)?));
        }
        if let Some(list) = rest.strip_prefix("in") {
            let inner = list
                .trim()
                .strip_prefix('[')
                .and_then(|s| s.strip_suffix(']'))
                .ok_or_else(|| invalid(predicate, "expected a bracketed list after 'in'"))?;
            let values = inner
                .split(',')
                .filter(|item| !item.trim().is_empty())
                .map(|item| parse_literal(item, predicate))
                .collect::<Result<Vec<_>>>()?;
            if values.is_empty() {
                return Err(invalid(predicate, "empty value list"));
            }
            return Ok(Condition::OneOf(values));
        }

        Err(invalid(predicate, "expected '==', '!=' or 'in'"))
    }

    /// Whether the record's discriminator satisfies this condition.
    ///
    /// A missing discriminator reads as the empty string; a non-string one
    /// never matches.
    pub fn matches(&self, record: &Value) -> bool {
        let actual = match record.get(DISCRIMINATOR) {
            None | Some(Value::Null) => "",
            Some(Value::String(s)) => s.as_str(),
            Some(_) => return false,
        };
        let actual = canonical_kind(actual);

        match self {
            Condition::Equals(expected) => canonical_kind(expected) == actual,
            Condition::NotEquals(expected) => canonical_kind(expected) != actual,
            Condition::OneOf(expected) => expected.iter().any(|e| canonical_kind(e) == actual),
        }
    }
}

/// All conditions must hold; an empty list always holds
pub fn all_match(conditions: &[Condition], record: &Value) -> bool {
    conditions.iter().all(|c| c.matches(record))
}

fn canonical_kind(value: &str) -> &str {
    KIND_ALIASES
        .iter()
        .find(|(alias, _)| *alias == value)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(value)
}

fn parse_literal(raw: &str, predicate: &str) -> Result<String> {
    let raw = raw.trim();
    for quote in ['\'', '"'] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return Ok(raw[1..raw.len() - 1].to_string());
        }
    }
    if !raw.is_empty() && raw.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Ok(raw.to_string());
    }
    Err(invalid(predicate, format!("invalid literal '{}'", raw)))
}

fn invalid(predicate: &str, message: impl Into<String>) -> Error {
    Error::rule(format!("condition `{}`", predicate), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Condition::parse("type == 'chat'").unwrap(), Condition::Equals("chat".into()));
        assert_eq!(Condition::parse("== \"chat\"").unwrap(), Condition::Equals("chat".into()));
        assert_eq!(
            Condition::parse("type != 'embedding'").unwrap(),
            Condition::NotEquals("embedding".into())
        );
        assert_eq!(
            Condition::parse("type in ['chat', \"completion\"]").unwrap(),
            Condition::OneOf(vec!["chat".into(), "completion".into()])
        );
    }

    #[test]
    fn test_parse_rejects_code() {
        assert!(Condition::parse("__import__('os').system('ls')").is_err());
        assert!(Condition::parse("type == 'a' or True").is_err());
        assert!(Condition::parse("type in []").is_err());
        assert!(Condition::parse("type >= 3").is_err());
    }

    #[test]
    fn test_equals_matches_discriminator() {
        let cond = Condition::parse("type == 'chat'").unwrap();
        assert!(cond.matches(&json!({"type": "chat"})));
        assert!(!cond.matches(&json!({"type": "embedding"})));
        assert!(!cond.matches(&json!({})));
    }

    #[test]
    fn test_completion_alias_both_directions() {
        let singular = Condition::parse("type == 'completion'").unwrap();
        let plural = Condition::parse("type == 'completions'").unwrap();
        for kind in ["completion", "completions"] {
            let record = json!({"type": kind});
            assert!(singular.matches(&record));
            assert!(plural.matches(&record));
        }
        assert!(!singular.matches(&json!({"type": "chat"})));
    }

    #[test]
    fn test_non_string_discriminator_never_matches() {
        let cond = Condition::parse("type != 'chat'").unwrap();
        assert!(!cond.matches(&json!({"type": 3})));
        assert!(cond.matches(&json!({"type": "embedding"})));
    }

    #[test]
    fn test_one_of_and_all_match() {
        let conds = vec![
            Condition::parse("type in ['chat', 'completion']").unwrap(),
            Condition::parse("type != 'chat'").unwrap(),
        ];
        assert!(all_match(&conds, &json!({"type": "completions"})));
        assert!(!all_match(&conds, &json!({"type": "chat"})));
        assert!(all_match(&[], &json!({})));
    }
}
