//! Incremental text extraction from streaming provider responses
//!
//! Three framings are recognised per line: Server-Sent-Events `data:` lines
//! ending with `data: [DONE]`, AWS event-stream frames whose JSON body carries
//! a base64 `bytes` payload, and bare JSON objects with a `delta.text` member.
//! The caller supplies the path-query locating the text inside a decoded
//! payload, for example `choices[0].delta.content`.
//!
//! # Example
//!
//! ```
//! use gatewire_core::streaming::{StreamLineProcessor, TextFragments};
//!
//! let body = "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\
//!             data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\
//!             data: [DONE]\n";
//! let processor = StreamLineProcessor::new("choices[0].delta.content").unwrap();
//! let text: String = TextFragments::new(processor, body.lines()).collect();
//! assert_eq!(text, "Hello");
//! ```

pub mod framing;
pub mod processor;
pub mod stream;

pub use framing::StreamFraming;
pub use processor::{LineOutcome, StreamLineProcessor};
pub use stream::{fragments_from_buf_read, fragments_from_bytes, fragments_from_reader, TextFragments};

/// Path-query used when a route does not name one
pub const DEFAULT_STREAM_QUERY: &str = "choices[0].delta.content";
