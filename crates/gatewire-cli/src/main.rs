//! Gatewire CLI - command-line front end for provider schema normalization
//!
//! This is the main entry point for the Gatewire CLI application, providing
//! commands for preparing provider requests, parsing provider responses and
//! extracting text from streamed responses.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // Configuration is read before logging starts so its logging section applies
    let config = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };

    control::set_override(cli.use_color(&config.output));

    if let Err(e) = init_logging(&cli, &config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli, config).await {
        Ok(()) => process::exit(0),
        Err(e) => exit_with(e),
    }
}

fn exit_with(e: error::Error) -> ! {
    eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

    if e.should_show_help() {
        eprintln!("\nFor more information, try '--help'");
    }

    process::exit(e.exit_code());
}

/// Main application logic
#[instrument(skip(cli, config), fields(command = ?cli.command))]
async fn run(cli: Cli, config: Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let mut output = OutputWriter::new(
        cli.output_format(&config.output),
        cli.use_color(&config.output),
        cli.quiet,
        cli.verbosity_level(),
    );

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Prepare(args) => handlers::handle_prepare(args, &config, &mut output).await,
        Commands::Parse(args) => handlers::handle_parse(args, &config, &mut output).await,
        Commands::Stream(args) => handlers::handle_stream(args, &config, &mut output).await,
        Commands::Schemas(args) => handlers::handle_schemas(args, &config, &mut output).await,
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    logging_config.merge_with_settings(&config.logging, cli.verbosity_level());
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
