//! Stream command handler

use crate::cli::{OutputFormat, StreamArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use futures_util::StreamExt;
use gatewire_core::streaming::{fragments_from_reader, DEFAULT_STREAM_QUERY};
use gatewire_core::StreamLineProcessor;
use serde_json::json;
use tokio::io::{AsyncBufRead, BufReader};

/// Handle the stream command
pub async fn handle_stream(args: StreamArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let query = match (&args.query, &args.route) {
        (Some(query), _) => query.clone(),
        (None, Some(route)) => config.route(route)?.stream_query().to_string(),
        (None, None) => DEFAULT_STREAM_QUERY.to_string(),
    };
    let processor = StreamLineProcessor::new(&query)?;
    tracing::debug!(%query, "Extracting stream fragments");

    match args.stream_file.as_deref() {
        Some(path) if path.as_os_str() != "-" => {
            if !path.exists() {
                return Err(Error::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            let file = tokio::fs::File::open(path).await?;
            drain(processor, BufReader::new(file), args.join, output).await
        }
        _ => drain(processor, BufReader::new(tokio::io::stdin()), args.join, output).await,
    }
}

/// Write fragments as they arrive in human format, or collected otherwise
async fn drain<R>(
    processor: StreamLineProcessor,
    reader: R,
    join: bool,
    output: &mut OutputWriter,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let fragments = fragments_from_reader(processor, reader);
    futures_util::pin_mut!(fragments);

    if output.format() == OutputFormat::Human {
        let mut count = 0usize;
        while let Some(fragment) = fragments.next().await {
            if join {
                output.write(&fragment)?;
            } else {
                output.writeln(&fragment)?;
            }
            count += 1;
        }
        if join && count > 0 {
            output.writeln("")?;
        }
        tracing::debug!(count, "Stream finished");
        return Ok(());
    }

    let collected: Vec<String> = fragments.collect().await;
    output.data(&json!({
        "fragments": collected,
        "text": collected.concat(),
    }))
}
