//! Per-line detection of streaming wire framings

use serde_json::Value;

/// Marker present in every AWS event-stream frame header
pub const EVENT_STREAM_MARKER: &str = "message-type";

/// SSE field prefix carrying the payload
pub const SSE_DATA_PREFIX: &str = "data:";

/// SSE payload that terminates the stream
pub const SSE_DONE: &str = "[DONE]";

/// How a single line of a streaming body is framed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFraming {
    /// Event-stream frame with an embedded JSON event
    EventStream,
    /// `data: ...` Server-Sent-Events line
    Sse,
    /// Bare JSON object with a `delta` member
    DeltaJson,
}

impl StreamFraming {
    /// Classify a line, in priority order; `None` for keep-alives and
    /// metadata lines
    pub fn detect(line: &str) -> Option<Self> {
        if line.contains(EVENT_STREAM_MARKER) {
            Some(StreamFraming::EventStream)
        } else if line.starts_with(SSE_DATA_PREFIX) {
            Some(StreamFraming::Sse)
        } else if line.trim_start().starts_with('{') && line.contains("\"delta\"") {
            Some(StreamFraming::DeltaJson)
        } else {
            None
        }
    }
}

/// The payload of an SSE data line, with one optional leading space removed
pub fn sse_payload(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(SSE_DATA_PREFIX)?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Parse the JSON object embedded in an event-stream frame.
///
/// Frames carry binary headers around the event body, so the body is taken
/// as the span from the first `{` to the last `}`.
pub fn embedded_json(line: &str) -> Option<Value> {
    let start = line.find('{')?;
    let end = line.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&line[start..=end]).ok()
}
