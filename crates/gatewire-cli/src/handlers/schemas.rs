//! Schemas command handler

use super::utils::load_registry;
use crate::cli::{OutputFormat, SchemasArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use gatewire_core::schema::normalize_provider;
use serde::Serialize;

/// One registered provider/model spec
#[derive(Debug, Serialize)]
struct SchemaEntry {
    provider: String,
    model: String,
    input_rules: usize,
    output_rules: usize,
}

/// Handle the schemas command
pub async fn handle_schemas(args: SchemasArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let registry = load_registry(config)?;
    let filter = args.provider.as_deref().map(normalize_provider);

    let mut entries = Vec::new();
    for (provider, model) in registry.entries() {
        if filter.as_deref().is_some_and(|f| f != provider) {
            continue;
        }
        let spec = registry.get(provider, model)?;
        entries.push(SchemaEntry {
            provider: provider.to_string(),
            model: model.to_string(),
            input_rules: spec.input_rules().len(),
            output_rules: spec.output_rules().len(),
        });
    }

    if output.format() != OutputFormat::Human {
        return output.data(&entries);
    }

    if entries.is_empty() {
        output.warning("No schemas registered")?;
        return Ok(());
    }

    let rows = entries
        .iter()
        .map(|e| {
            vec![
                e.provider.clone(),
                e.model.clone(),
                e.input_rules.to_string(),
                e.output_rules.to_string(),
            ]
        })
        .collect();
    output.table(&["PROVIDER", "MODEL", "INPUT", "OUTPUT"], rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::capture::capture;
    use std::io::Write;

    #[tokio::test]
    async fn test_lists_builtin_schemas() {
        let (mut output, buf) = capture(OutputFormat::Json);
        handle_schemas(SchemasArgs { provider: None }, &Config::default(), &mut output)
            .await
            .unwrap();

        let listed: Vec<serde_json::Value> = serde_json::from_str(buf.contents().trim()).unwrap();
        let keys: Vec<(String, String)> = listed
            .iter()
            .map(|e| (e["provider"].as_str().unwrap().to_string(), e["model"].as_str().unwrap().to_string()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("amazon".to_string(), "llama".to_string()),
                ("amazon".to_string(), "titan".to_string()),
                ("azureopenai".to_string(), "*".to_string()),
                ("openai".to_string(), "*".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_schemas_dir_and_provider_filter() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("claude.yaml")).unwrap();
        writeln!(
            file,
            r#"
provider: Anthropic
model: claude-3
input_rules:
  - source_path: prompt
    target_path: messages
    transform_function: format_claude_completion
output_rules:
  - source_path: content[0].text
    target_path: choices[0].message.content
"#
        )
        .unwrap();

        let config = Config {
            schemas_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        let (mut output, buf) = capture(OutputFormat::Human);
        handle_schemas(SchemasArgs { provider: Some(" ANTHROPIC ".to_string()) }, &config, &mut output)
            .await
            .unwrap();

        let contents = buf.contents();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("anthropic │ claude-3 │ 1"));
    }
}
