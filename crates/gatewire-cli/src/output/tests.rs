// Tests for output formatting
//
// Output goes to an in-memory sink so the rendered text can be inspected.

use super::*;
use gatewire_core::{ChatCompletion, Usage};
use crate::output::capture::SharedBuf;
use serde_json::json;

fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, SharedBuf) {
    let buf = SharedBuf::default();
    let writer = OutputWriter::with_writer(format, false, quiet, 0, Box::new(buf.clone()));
    (writer, buf)
}

fn sample_completion() -> ChatCompletion {
    ChatCompletion::from_fields(
        "amazon.titan-text-express-v1",
        json!({
            "id": "chatcmpl-test",
            "created": 1_700_000_000,
            "choices": [{"message": {"content": "Bonjour"}, "finish_reason": "FINISH"}],
            "usage": {"prompt_tokens": 4, "completion_tokens": 2}
        }),
    )
}

#[test]
fn test_completion_human_rendering() {
    let (mut out, buf) = writer(OutputFormat::Human, false);
    out.completion(&sample_completion()).unwrap();
    let text = buf.contents();
    assert!(text.contains("id:            chatcmpl-test"));
    assert!(text.contains("[FINISH] Bonjour"));
    assert!(text.contains("prompt=4 completion=2 total=6"));
}

#[test]
fn test_completion_json_rendering_is_machine_readable() {
    let (mut out, buf) = writer(OutputFormat::Json, false);
    out.completion(&sample_completion()).unwrap();
    let value: serde_json::Value = serde_json::from_str(buf.contents().trim()).unwrap();
    assert_eq!(value["object"], json!("chat.completion"));
    assert_eq!(value["usage"]["total_tokens"], json!(6));
}

#[test]
fn test_messages_only_in_human_format() {
    let (mut out, buf) = writer(OutputFormat::Json, false);
    out.info("hello").unwrap();
    out.success("done").unwrap();
    out.section("Section").unwrap();
    assert_eq!(buf.contents(), "");

    let (mut out, buf) = writer(OutputFormat::Human, false);
    out.info("hello").unwrap();
    out.warning("careful").unwrap();
    assert_eq!(buf.contents(), "INFO: hello\nWARNING: careful\n");
}

#[test]
fn test_quiet_suppresses_info_but_not_data() {
    let (mut out, buf) = writer(OutputFormat::Human, true);
    out.info("hello").unwrap();
    out.data(&json!({"a": 1})).unwrap();
    assert_eq!(buf.contents(), "{\n  \"a\": 1\n}\n");
}

#[test]
fn test_yaml_data_has_single_trailing_newline() {
    let (mut out, buf) = writer(OutputFormat::Yaml, false);
    out.data(&json!({"a": 1})).unwrap();
    assert_eq!(buf.contents(), "a: 1\n");
}

#[test]
fn test_table_alignment() {
    let (mut out, buf) = writer(OutputFormat::Human, false);
    out.table(
        &["PROVIDER", "MODEL"],
        vec![
            vec!["amazon".to_string(), "llama".to_string()],
            vec!["openai".to_string(), "*".to_string()],
        ],
    )
    .unwrap();
    let lines: Vec<String> = buf.contents().lines().map(str::to_string).collect();
    assert_eq!(lines[0], "PROVIDER │ MODEL");
    assert_eq!(lines[2], "amazon   │ llama");
    assert_eq!(lines[3], "openai   │ *");
}

#[test]
fn test_usage_helper_matches_envelope() {
    assert_eq!(sample_completion().usage, Usage::new(4, 2));
}
