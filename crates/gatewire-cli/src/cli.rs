//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use crate::config::OutputConfig;
use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Gatewire CLI - provider schema normalization for LLM gateways
///
/// Prepares provider-native request bodies from canonical records, parses
/// provider responses into the canonical chat-completion envelope, and
/// extracts text fragments from streamed responses.
#[derive(Parser, Debug)]
#[command(
    name = "gatewire",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "GATEWIRE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results [default: human, or the configured format]
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transform a canonical request record into a provider request body
    Prepare(PrepareArgs),

    /// Normalize a provider response into the canonical completion envelope
    Parse(ParseArgs),

    /// Extract text fragments from a streamed provider response
    Stream(StreamArgs),

    /// List the registered provider/model schemas
    Schemas(SchemasArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Provider, model and route selection shared by prepare and parse
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Provider name (e.g. openai, amazon)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model name or provider model identifier
    #[arg(short, long)]
    pub model: Option<String>,

    /// Route name from the configuration file
    #[arg(short, long)]
    pub route: Option<String>,
}

/// Arguments for the prepare command
#[derive(Parser, Debug)]
pub struct PrepareArgs {
    /// Path to the canonical request record (JSON or YAML)
    #[arg(value_name = "REQUEST_FILE")]
    pub request_file: PathBuf,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Save the prepared request to a file
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the parse command
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Path to the raw provider response (JSON or YAML)
    #[arg(value_name = "RESPONSE_FILE")]
    pub response_file: PathBuf,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Print only the completion text
    #[arg(long)]
    pub text_only: bool,

    /// Save the normalized envelope to a file
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the stream command
#[derive(Parser, Debug)]
pub struct StreamArgs {
    /// File holding the streamed body, one line per event ("-" or absent reads stdin)
    #[arg(value_name = "STREAM_FILE")]
    pub stream_file: Option<PathBuf>,

    /// Path-query expression selecting the text of each event
    #[arg(long, conflicts_with = "route")]
    pub query: Option<String>,

    /// Route name whose stream query should be used
    #[arg(short, long)]
    pub route: Option<String>,

    /// Concatenate fragments instead of printing one per line
    #[arg(long)]
    pub join: bool,
}

/// Arguments for the schemas command
#[derive(Parser, Debug)]
pub struct SchemasArgs {
    /// Only list schemas for this provider
    #[arg(short, long)]
    pub provider: Option<String>,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self, config: &OutputConfig) -> bool {
        !self.no_color && config.color && std::io::stdout().is_terminal()
    }

    /// The output format flag, falling back to the configured format
    pub fn output_format(&self, config: &OutputConfig) -> OutputFormat {
        if let Some(format) = self.output {
            return format;
        }
        match OutputFormat::from_str(&config.format, true) {
            Ok(OutputFormat::Json) if config.pretty => OutputFormat::JsonPretty,
            Ok(format) => format,
            Err(_) => OutputFormat::Human,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
