//! Source path resolution and target path writing

use super::types::TransformError;
use crate::query::PathQuery;
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::fmt;

/// Canonical top-level fields looked up directly without query evaluation
const WELL_KNOWN_FIELDS: &[&str] = &["messages", "prompt"];

/// Where a rule reads its value from
#[derive(Debug, Clone, PartialEq)]
pub enum SourcePath {
    /// A single top-level key
    Literal(String),
    /// A compiled path-query expression
    Query(PathQuery),
}

impl SourcePath {
    /// Compile a source path.
    ///
    /// Well-known canonical fields and paths that are not valid query
    /// expressions are treated as literal top-level keys.
    pub fn compile(path: &str) -> Self {
        if WELL_KNOWN_FIELDS.contains(&path) {
            return SourcePath::Literal(path.to_string());
        }
        match PathQuery::parse(path) {
            Ok(query) => SourcePath::Query(query),
            Err(e) => {
                log::debug!("Source path '{}' is not a query ({}), using literal key", path, e);
                SourcePath::Literal(path.to_string())
            }
        }
    }

    /// Resolve against a record; null and missing both yield `None`
    pub fn resolve(&self, record: &Value) -> Option<Value> {
        match self {
            SourcePath::Literal(key) => record.get(key).filter(|v| !v.is_null()).cloned(),
            SourcePath::Query(query) => query.evaluate(record),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SourcePath::Literal(key) => key,
            SourcePath::Query(query) => query.as_str(),
        }
    }
}

impl fmt::Display for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TargetSegment {
    key: String,
    index: Option<usize>,
}

/// Dot-delimited output location, each segment optionally indexed (`choices[0]`)
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPath {
    segments: Vec<TargetSegment>,
    source: String,
}

impl TargetPath {
    /// Parse and validate a target path
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = |message: &str| Error::rule(format!("target path `{}`", path), message);

        if path.trim().is_empty() {
            return Err(invalid("empty target path"));
        }

        let mut segments = Vec::new();
        for raw in path.split('.') {
            let (key, index) = match raw.find('[') {
                Some(open) => {
                    let digits = raw[open + 1..]
                        .strip_suffix(']')
                        .ok_or_else(|| invalid("unterminated index"))?;
                    let index = digits
                        .parse::<usize>()
                        .map_err(|_| invalid("index must be a non-negative integer"))?;
                    (&raw[..open], Some(index))
                }
                None => (raw, None),
            };
            if key.is_empty() {
                return Err(invalid("empty segment"));
            }
            segments.push(TargetSegment {
                key: key.to_string(),
                index,
            });
        }

        Ok(Self {
            segments,
            source: path.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The top-level key this path writes under
    pub fn root_key(&self) -> &str {
        self.segments.first().map(|s| s.key.as_str()).unwrap_or_default()
    }

    /// Write `value`, creating intermediate maps and padding sequences.
    ///
    /// Fails without mutating anything when an existing non-container value
    /// sits where a map or sequence is needed.
    pub fn write(
        &self,
        output: &mut Map<String, Value>,
        value: Value,
    ) -> std::result::Result<(), TransformError> {
        let last = self.segments.len().saturating_sub(1);
        let mut map = output;
        let mut value = Some(value);

        for (position, segment) in self.segments.iter().enumerate() {
            let is_last = position == last;

            let slot = match segment.index {
                None if is_last => {
                    map.insert(segment.key.clone(), value.take().unwrap_or(Value::Null));
                    return Ok(());
                }
                None => map
                    .entry(segment.key.clone())
                    .or_insert_with(|| Value::Object(Map::new())),
                Some(index) => {
                    let entry = map
                        .entry(segment.key.clone())
                        .or_insert_with(|| Value::Array(Vec::new()));
                    if entry.is_null() {
                        *entry = Value::Array(Vec::new());
                    }
                    let items = entry
                        .as_array_mut()
                        .ok_or_else(|| self.conflict(&segment.key, "sequence"))?;
                    if items.len() <= index {
                        let fill = if is_last {
                            Value::Null
                        } else {
                            Value::Object(Map::new())
                        };
                        items.resize(index + 1, fill);
                    }
                    if is_last {
                        items[index] = value.take().unwrap_or(Value::Null);
                        return Ok(());
                    }
                    &mut items[index]
                }
            };

            if slot.is_null() {
                *slot = Value::Object(Map::new());
            }
            map = slot
                .as_object_mut()
                .ok_or_else(|| self.conflict(&segment.key, "map"))?;
        }

        Ok(())
    }

    fn conflict(&self, key: &str, needed: &str) -> TransformError {
        TransformError::TargetPath {
            path: self.source.clone(),
            message: format!("existing value at '{}' is not a {}", key, needed),
        }
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(path: &str, output: &mut Map<String, Value>, value: Value) {
        TargetPath::parse(path).unwrap().write(output, value).unwrap();
    }

    #[test]
    fn test_well_known_fields_are_literal() {
        assert_eq!(
            SourcePath::compile("messages"),
            SourcePath::Literal("messages".to_string())
        );
        assert!(matches!(
            SourcePath::compile("choices[0].message.content"),
            SourcePath::Query(_)
        ));
    }

    #[test]
    fn test_invalid_query_falls_back_to_literal_key() {
        let source = SourcePath::compile("max-tokens");
        assert_eq!(source, SourcePath::Literal("max-tokens".to_string()));
        assert_eq!(source.resolve(&json!({"max-tokens": 5})), Some(json!(5)));
    }

    #[test]
    fn test_resolve_miss_is_none() {
        let record = json!({"prompt": null, "choices": []});
        assert_eq!(SourcePath::compile("prompt").resolve(&record), None);
        assert_eq!(SourcePath::compile("choices[0].text").resolve(&record), None);
        assert_eq!(SourcePath::compile("prompt").resolve(&json!("scalar")), None);
    }

    #[test]
    fn test_write_nested_creates_maps() {
        let mut out = Map::new();
        write("textGenerationConfig.maxTokenCount", &mut out, json!(50));
        write("textGenerationConfig.temperature", &mut out, json!(0.7));
        assert_eq!(
            Value::Object(out),
            json!({"textGenerationConfig": {"maxTokenCount": 50, "temperature": 0.7}})
        );
    }

    #[test]
    fn test_write_indexed_segments_pad() {
        let mut out = Map::new();
        write("choices[1].message.content", &mut out, json!("hi"));
        write("tags[2]", &mut out, json!("x"));
        assert_eq!(
            Value::Object(out),
            json!({
                "choices": [{}, {"message": {"content": "hi"}}],
                "tags": [null, null, "x"]
            })
        );
    }

    #[test]
    fn test_write_last_wins() {
        let mut out = Map::new();
        write("prompt", &mut out, json!("a"));
        write("prompt", &mut out, json!("b"));
        assert_eq!(out.get("prompt"), Some(&json!("b")));
    }

    #[test]
    fn test_write_conflict_leaves_output_untouched() {
        let mut out = Map::new();
        out.insert("config".to_string(), json!(3));
        let err = TargetPath::parse("config.temperature")
            .unwrap()
            .write(&mut out, json!(0.5))
            .unwrap_err();
        assert!(matches!(err, TransformError::TargetPath { .. }));
        assert_eq!(Value::Object(out), json!({"config": 3}));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(TargetPath::parse("").is_err());
        assert!(TargetPath::parse("a..b").is_err());
        assert!(TargetPath::parse("a[x]").is_err());
        assert!(TargetPath::parse("a[0").is_err());
        assert!(TargetPath::parse("a[-1]").is_err());
        assert_eq!(TargetPath::parse("choices[0].text").unwrap().root_key(), "choices");
    }
}
