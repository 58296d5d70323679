//! Path-query expressions for locating values inside nested records
//!
//! Supports a JMESPath-style subset: `a.b.c`, `"quoted-name"`, `a[0]`,
//! `a[-1]`, `a[*].b` and `a.*`. Once a projection is entered, the remaining
//! segments are applied to every projected element and the result is a
//! sequence of the non-null values produced. Further projections flatten one
//! level.
//!
//! Evaluation is total: anything that does not match yields `None`.
//!
//! Copyright (c) 2025 Gatewire Team
//! Licensed under the Apache-2.0 license

pub mod ast;
pub mod error;
pub mod parser;

pub use ast::{Query, Segment};
pub use error::QueryError;
pub use parser::Parser;

use crate::Result;
use serde_json::Value;

/// A compiled path-query expression
#[derive(Debug, Clone, PartialEq)]
pub struct PathQuery {
    query: Query,
    source: String,
}

enum Selection<'a> {
    Single(&'a Value),
    Projected(Vec<&'a Value>),
}

impl PathQuery {
    /// Parse and compile a path-query expression
    pub fn parse(path: &str) -> Result<Self> {
        let query = Parser::new(path)?.parse()?;
        Ok(Self {
            query,
            source: path.to_string(),
        })
    }

    /// The expression text this query was compiled from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled segments
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Evaluate against a record, returning an owned copy of the match
    pub fn evaluate(&self, data: &Value) -> Option<Value> {
        match self.select(data)? {
            Selection::Single(value) if value.is_null() => None,
            Selection::Single(value) => Some(value.clone()),
            Selection::Projected(values) => Some(Value::Array(
                values.into_iter().filter(|v| !v.is_null()).cloned().collect(),
            )),
        }
    }

    /// Evaluate and borrow the match when it is a single value
    pub fn evaluate_ref<'a>(&self, data: &'a Value) -> Option<&'a Value> {
        match self.select(data)? {
            Selection::Single(value) if !value.is_null() => Some(value),
            _ => None,
        }
    }

    fn select<'a>(&self, data: &'a Value) -> Option<Selection<'a>> {
        let mut current = Selection::Single(data);

        for segment in &self.query.segments {
            current = match current {
                Selection::Single(value) => match segment {
                    Segment::Field(name) => Selection::Single(value.as_object()?.get(name)?),
                    Segment::Index(index) => Selection::Single(index_into(value, *index)?),
                    Segment::ListProjection => {
                        Selection::Projected(value.as_array()?.iter().collect())
                    }
                    Segment::ValueProjection => {
                        Selection::Projected(value.as_object()?.values().collect())
                    }
                },
                Selection::Projected(values) => {
                    let next = values.into_iter();
                    Selection::Projected(match segment {
                        Segment::Field(name) => next
                            .filter_map(|v| v.as_object().and_then(|o| o.get(name)))
                            .filter(|v| !v.is_null())
                            .collect(),
                        Segment::Index(index) => {
                            next.filter_map(|v| index_into(v, *index)).collect()
                        }
                        Segment::ListProjection => next
                            .filter_map(Value::as_array)
                            .flat_map(|a| a.iter())
                            .collect(),
                        Segment::ValueProjection => next
                            .filter_map(Value::as_object)
                            .flat_map(|o| o.values())
                            .collect(),
                    })
                }
            };
        }

        Some(current)
    }
}

fn index_into(value: &Value, index: i64) -> Option<&Value> {
    let items = value.as_array()?;
    let position = if index < 0 {
        items.len().checked_sub(index.unsigned_abs() as usize)?
    } else {
        index as usize
    };
    items.get(position)
}

impl std::fmt::Display for PathQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.query)
    }
}

impl std::str::FromStr for PathQuery {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Compile and evaluate in one step; a malformed expression yields `None`
pub fn search(path: &str, data: &Value) -> Option<Value> {
    match PathQuery::parse(path) {
        Ok(query) => query.evaluate(data),
        Err(e) => {
            log::debug!("Ignoring malformed path query '{}': {}", path, e);
            None
        }
    }
}
