//! Streaming line processor
//!
//! Turns one raw line of a streaming response body into at most one text
//! fragment. The processor never fails: lines it cannot make sense of are
//! skipped. Once the SSE terminator has been seen every later line reports
//! [`LineOutcome::Done`].
//!
//! Copyright (c) 2025 Gatewire Team
//! Licensed under the Apache-2.0 license

use super::framing::{embedded_json, sse_payload, StreamFraming, SSE_DONE};
use crate::query::PathQuery;
use crate::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;

/// Result of feeding one line to the processor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// A non-empty text fragment
    Fragment(String),
    /// Nothing to extract from this line
    Skip,
    /// End of stream
    Done,
}

/// Stateful extractor of text fragments from streaming lines
#[derive(Debug, Clone)]
pub struct StreamLineProcessor {
    query: PathQuery,
    done: bool,
}

impl StreamLineProcessor {
    /// Create a processor locating text with the path-query `query`
    pub fn new(query: &str) -> Result<Self> {
        Ok(Self::from_query(PathQuery::parse(query)?))
    }

    pub fn from_query(query: PathQuery) -> Self {
        Self { query, done: false }
    }

    pub fn query(&self) -> &PathQuery {
        &self.query
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Process one line, with or without its line terminator
    pub fn process_line(&mut self, line: &str) -> LineOutcome {
        if self.done {
            return LineOutcome::Done;
        }

        let line = line.trim_end_matches(['\r', '\n']);
        let text = match StreamFraming::detect(line) {
            Some(StreamFraming::EventStream) => self.event_stream_text(line),
            Some(StreamFraming::Sse) => {
                let payload = sse_payload(line).unwrap_or_default().trim();
                if payload == SSE_DONE {
                    self.done = true;
                    return LineOutcome::Done;
                }
                parse_json(payload).and_then(|event| self.located_text(&event))
            }
            Some(StreamFraming::DeltaJson) => parse_json(line.trim()).and_then(|event| delta_text(&event)),
            None => None,
        };

        match text {
            Some(text) if !text.is_empty() => LineOutcome::Fragment(text),
            _ => LineOutcome::Skip,
        }
    }

    fn event_stream_text(&self, line: &str) -> Option<String> {
        let event = match embedded_json(line) {
            Some(event) => event,
            None => {
                log::debug!("Skipping event-stream frame without a JSON body");
                return None;
            }
        };

        match event.get("bytes").and_then(Value::as_str) {
            Some(encoded) => {
                let decoded = STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| log::debug!("Skipping event-stream frame with bad base64: {}", e))
                    .ok()?;
                let payload: Value = serde_json::from_slice(&decoded)
                    .map_err(|e| log::debug!("Skipping event-stream payload that is not JSON: {}", e))
                    .ok()?;
                self.located_text(&payload)
            }
            None => delta_text(&event),
        }
    }

    fn located_text(&self, payload: &Value) -> Option<String> {
        self.query.evaluate_ref(payload).and_then(text_of)
    }
}

fn parse_json(text: &str) -> Option<Value> {
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("Skipping stream line that is not JSON: {}", e);
            None
        }
    }
}

fn delta_text(event: &Value) -> Option<String> {
    event.get("delta")?.get("text").and_then(text_of)
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
