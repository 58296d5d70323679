//! Parse command handler

use super::utils::{load_registry, read_document, save_document, Target};
use crate::cli::ParseArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use gatewire_core::ModelAdapter;
use std::sync::Arc;

/// Handle the parse command
pub async fn handle_parse(args: ParseArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let raw = read_document(&args.response_file)?;
    let registry = load_registry(config)?;
    let target = Target::resolve(&args.target, config, &registry)?;

    output.info(&format!(
        "Parsing {} from {}/{}",
        args.response_file.display(),
        target.provider,
        target.model
    ))?;

    let adapter = ModelAdapter::with_registry(Arc::new(registry));
    let mut completion = adapter.parse_response(&target.provider, &target.schema_key, &raw)?;

    // family-keyed lookups report the concrete model unless the response named one
    if completion.model == target.schema_key {
        completion.model = target.model.clone();
    }

    if args.text_only {
        output.writeln(completion.text())?;
    } else {
        output.section("Completion")?;
        output.completion(&completion)?;
    }

    if let Some(path) = args.save_to {
        save_document(&path, &completion)?;
        output.success(&format!("✓ Completion saved to {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{OutputFormat, TargetArgs};
    use crate::output::capture::capture;
    use serde_json::{json, Value};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn response_file(body: &Value) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{}", body).unwrap();
        file
    }

    fn args(file: &NamedTempFile, provider: &str, model: &str, text_only: bool) -> ParseArgs {
        ParseArgs {
            response_file: file.path().to_path_buf(),
            target: TargetArgs {
                provider: Some(provider.to_string()),
                model: Some(model.to_string()),
                route: None,
            },
            text_only,
            save_to: None,
        }
    }

    #[tokio::test]
    async fn test_parse_llama_response_into_envelope() {
        let file = response_file(&json!({
            "generation": "Bonjour",
            "stop_reason": "stop",
            "prompt_token_count": 5,
            "generation_token_count": 2
        }));
        let (mut output, buf) = capture(OutputFormat::Json);

        handle_parse(
            args(&file, "amazon", "meta.llama3-8b-instruct-v1:0", false),
            &Config::default(),
            &mut output,
        )
        .await
        .unwrap();

        let envelope: Value = serde_json::from_str(buf.contents().trim()).unwrap();
        assert_eq!(envelope["model"], json!("meta.llama3-8b-instruct-v1:0"));
        assert_eq!(envelope["choices"][0]["message"]["content"], json!("Bonjour"));
        assert_eq!(envelope["usage"], json!({"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}));
    }

    #[tokio::test]
    async fn test_parse_text_only() {
        let file = response_file(&json!({"choices": [{"message": {"content": "hi"}}]}));
        let (mut output, buf) = capture(OutputFormat::Human);

        handle_parse(args(&file, "openai", "gpt-4o", true), &Config::default(), &mut output)
            .await
            .unwrap();

        assert!(buf.contents().ends_with("hi\n"));
    }
}
