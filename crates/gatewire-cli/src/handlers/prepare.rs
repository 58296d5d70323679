//! Prepare command handler

use super::utils::{load_registry, read_document, save_document, Target};
use crate::cli::PrepareArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::redaction;
use crate::output::OutputWriter;
use gatewire_core::transform::DISCRIMINATOR;
use gatewire_core::ModelAdapter;
use std::sync::Arc;

/// Handle the prepare command
pub async fn handle_prepare(args: PrepareArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let record = read_document(&args.request_file)?;
    let registry = load_registry(config)?;
    let target = Target::resolve(&args.target, config, &registry)?;

    output.info(&format!(
        "Preparing {} for {}/{}",
        args.request_file.display(),
        target.provider,
        target.model
    ))?;
    tracing::debug!(request = %redaction::redacted(&record), "Canonical request");

    if record.get(DISCRIMINATOR).is_none() {
        output.warning(&format!(
            "Request has no '{}' field; rules conditioned on the request kind will not apply",
            DISCRIMINATOR
        ))?;
    }

    let adapter = ModelAdapter::with_registry(Arc::new(registry));
    let prepared = adapter.prepare_request(&target.provider, &target.schema_key, &record)?;

    output.section("Provider Request")?;
    output.data(&prepared)?;

    if let Some(path) = args.save_to {
        save_document(&path, &prepared)?;
        output.success(&format!("✓ Request saved to {}", path.display()))?;
    }

    Ok(())
}
