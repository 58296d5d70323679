//! Pull-based drivers over a [`StreamLineProcessor`]
//!
//! The synchronous iterator and the two asynchronous streams yield exactly the
//! same fragments for the same lines. Nothing is read until the previous
//! fragment has been consumed; dropping a driver stops reading.

use super::processor::{LineOutcome, StreamLineProcessor};
use bytes::BytesMut;
use futures_util::{Stream, StreamExt};
use std::fmt::Display;
use std::io::BufRead;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Iterator of text fragments over an iterator of lines
pub struct TextFragments<I> {
    lines: I,
    processor: StreamLineProcessor,
}

impl<I> TextFragments<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    pub fn new(processor: StreamLineProcessor, lines: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            lines: lines.into_iter(),
            processor,
        }
    }

    /// Give back the processor, for example to check [`StreamLineProcessor::is_done`]
    pub fn into_processor(self) -> StreamLineProcessor {
        self.processor
    }
}

impl<I> Iterator for TextFragments<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.processor.is_done() {
            return None;
        }
        for line in self.lines.by_ref() {
            match self.processor.process_line(line.as_ref()) {
                LineOutcome::Fragment(text) => return Some(text),
                LineOutcome::Skip => continue,
                LineOutcome::Done => return None,
            }
        }
        None
    }
}

/// Decode one raw line; bytes that are not UTF-8 become replacement characters
fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Fragments from a blocking reader; a read error ends the sequence.
///
/// Lines are read as raw bytes, so binary framing around a payload does not
/// end the stream.
pub fn fragments_from_buf_read<R: BufRead>(
    processor: StreamLineProcessor,
    mut reader: R,
) -> TextFragments<impl Iterator<Item = String>> {
    let mut raw = Vec::new();
    let lines = std::iter::from_fn(move || {
        raw.clear();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => None,
            Ok(_) => Some(decode_line(&raw)),
            Err(e) => {
                log::debug!("Stopping stream on read error: {}", e);
                None
            }
        }
    });
    TextFragments::new(processor, lines)
}

/// Async fragments from a line-oriented reader; a read error ends the stream
pub fn fragments_from_reader<R>(
    processor: StreamLineProcessor,
    reader: R,
) -> impl Stream<Item = String>
where
    R: AsyncBufRead + Unpin,
{
    let state = (reader, processor, Vec::new());

    futures_util::stream::unfold(state, |(mut reader, mut processor, mut raw)| async move {
        if processor.is_done() {
            return None;
        }
        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw).await {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    log::debug!("Stopping stream on read error: {}", e);
                    return None;
                }
            }
            match processor.process_line(&decode_line(&raw)) {
                LineOutcome::Fragment(text) => return Some((text, (reader, processor, raw))),
                LineOutcome::Skip => continue,
                LineOutcome::Done => return None,
            }
        }
    })
}

/// State threaded through the byte-chunk `unfold` stream
struct ChunkState<S> {
    stream: S,
    buf: BytesMut,
    processor: StreamLineProcessor,
    exhausted: bool,
}

/// Async fragments from a stream of byte chunks.
///
/// Chunks are buffered and split on `\n`; a trailing line without a newline is
/// processed at end of input. A transport error ends the stream.
pub fn fragments_from_bytes<S, B, E>(
    processor: StreamLineProcessor,
    byte_stream: S,
) -> impl Stream<Item = String>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let state = ChunkState {
        stream: Box::pin(byte_stream),
        buf: BytesMut::new(),
        processor,
        exhausted: false,
    };

    futures_util::stream::unfold(state, |mut st| async move {
        loop {
            if st.processor.is_done() {
                return None;
            }

            let line = if let Some(pos) = st.buf.iter().position(|b| *b == b'\n') {
                st.buf.split_to(pos + 1)
            } else if st.exhausted {
                if st.buf.is_empty() {
                    return None;
                }
                st.buf.split()
            } else {
                match st.stream.next().await {
                    Some(Ok(chunk)) => st.buf.extend_from_slice(chunk.as_ref()),
                    Some(Err(e)) => {
                        log::debug!("Stopping stream on transport error: {}", e);
                        return None;
                    }
                    None => st.exhausted = true,
                }
                continue;
            };

            match st.processor.process_line(&decode_line(&line)) {
                LineOutcome::Fragment(fragment) => return Some((fragment, st)),
                LineOutcome::Skip => continue,
                LineOutcome::Done => return None,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> StreamLineProcessor {
        StreamLineProcessor::new("choices[0].delta.content").unwrap()
    }

    const BODY: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n\
                        data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n\
                        data: [DONE]\n\
                        data: {\"choices\":[{\"delta\":{\"content\":\"!\"}}]}\n";

    #[test]
    fn test_iterator_stops_at_done() {
        let fragments: Vec<String> = TextFragments::new(processor(), BODY.lines()).collect();
        assert_eq!(fragments, vec!["Hel", "lo"]);
    }

    #[test]
    fn test_iterator_is_fused_after_done() {
        let mut fragments = TextFragments::new(processor(), BODY.lines());
        assert_eq!(fragments.by_ref().count(), 2);
        assert_eq!(fragments.next(), None);
        assert!(fragments.into_processor().is_done());
    }

    #[test]
    fn test_buf_read_driver() {
        let fragments: Vec<String> =
            fragments_from_buf_read(processor(), std::io::Cursor::new(BODY)).collect();
        assert_eq!(fragments, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_async_reader_matches_iterator() {
        let fragments: Vec<String> = fragments_from_reader(processor(), BODY.as_bytes())
            .collect()
            .await;
        assert_eq!(fragments, vec!["Hel", "lo"]);
    }

    /// Event-stream body whose frames carry non-UTF-8 prelude and CRC bytes
    fn binary_event_stream() -> Vec<u8> {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine as _;

        let mut body = Vec::new();
        for text in ["Hel", "lo"] {
            let payload = STANDARD.encode(format!("{{\"delta\":{{\"text\":\"{}\"}}}}", text));
            body.extend_from_slice(&[0x00, 0x00, 0x01, 0xff, 0xfe]);
            body.extend_from_slice(b":message-type\x07\x00\x05event");
            body.extend_from_slice(format!("{{\"bytes\":\"{}\"}}", payload).as_bytes());
            body.extend_from_slice(&[0x9a, 0xff, b'\n']);
        }
        body
    }

    #[test]
    fn test_buf_read_driver_survives_binary_framing() {
        let processor = StreamLineProcessor::new("delta.text").unwrap();
        let fragments: Vec<String> =
            fragments_from_buf_read(processor, std::io::Cursor::new(binary_event_stream())).collect();
        assert_eq!(fragments, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_async_reader_survives_binary_framing() {
        let processor = StreamLineProcessor::new("delta.text").unwrap();
        let body = binary_event_stream();
        let fragments: Vec<String> = fragments_from_reader(processor, body.as_slice())
            .collect()
            .await;
        assert_eq!(fragments, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_bytes_split_across_chunks() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = BODY
            .as_bytes()
            .chunks(7)
            .map(|c| Ok(c.to_vec()))
            .collect();
        let fragments: Vec<String> = fragments_from_bytes(processor(), futures_util::stream::iter(chunks))
            .collect()
            .await;
        assert_eq!(fragments, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_bytes_trailing_line_without_newline() {
        let chunks: Vec<Result<&[u8], std::io::Error>> =
            vec![Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"end\"}}]}".as_slice())];
        let fragments: Vec<String> = fragments_from_bytes(processor(), futures_util::stream::iter(chunks))
            .collect()
            .await;
        assert_eq!(fragments, vec!["end"]);
    }

    #[tokio::test]
    async fn test_bytes_transport_error_ends_stream() {
        let chunks: Vec<Result<&[u8], String>> = vec![
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n".as_slice()),
            Err("connection reset".to_string()),
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n".as_slice()),
        ];
        let fragments: Vec<String> = fragments_from_bytes(processor(), futures_util::stream::iter(chunks))
            .collect()
            .await;
        assert_eq!(fragments, vec!["a"]);
    }
}
