//! Abstract syntax tree for path-query expressions
//!
//! Copyright (c) 2025 Gatewire Team
//! Licensed under the Apache-2.0 license

use std::fmt;

/// A compiled path-query: a chain of segments applied left to right
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Segments in evaluation order
    pub segments: Vec<Segment>,
}

/// One step of a path-query
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Object member access (`.name` or `"quoted name"`)
    Field(String),
    /// Sequence index; negative values count from the end
    Index(i64),
    /// List projection (`[*]`)
    ListProjection,
    /// Object value projection (`.*`)
    ValueProjection,
}

impl Query {
    /// Create a query from its segments
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Whether evaluation produces a projected sequence
    pub fn is_projection(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::ListProjection | Segment::ValueProjection))
    }

    /// The field name if the query is a single plain member access
    pub fn simple_field(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [Segment::Field(name)] => Some(name),
            _ => None,
        }
    }
}

fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    if is_bare_identifier(name) {
                        write!(f, "{}", name)?;
                    } else {
                        write!(f, "\"{}\"", name.replace('"', "\\\""))?;
                    }
                }
                Segment::Index(index) => write!(f, "[{}]", index)?,
                Segment::ListProjection => write!(f, "[*]")?,
                Segment::ValueProjection => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "*")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_common_forms() {
        let query = Query::new(vec![
            Segment::Field("choices".to_string()),
            Segment::Index(0),
            Segment::Field("delta".to_string()),
            Segment::Field("content".to_string()),
        ]);
        assert_eq!(query.to_string(), "choices[0].delta.content");
        assert!(!query.is_projection());
    }

    #[test]
    fn test_display_quotes_unusual_names() {
        let query = Query::new(vec![
            Segment::Field("x-amz-meta".to_string()),
            Segment::ListProjection,
        ]);
        assert_eq!(query.to_string(), "\"x-amz-meta\"[*]");
        assert!(query.is_projection());
    }

    #[test]
    fn test_simple_field() {
        let query = Query::new(vec![Segment::Field("prompt".to_string())]);
        assert_eq!(query.simple_field(), Some("prompt"));
    }
}
