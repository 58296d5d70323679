//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod completions;
mod parse;
mod prepare;
mod schemas;
mod stream;
pub(crate) mod utils;

pub use completions::handle_completions;
pub use parse::handle_parse;
pub use prepare::handle_prepare;
pub use schemas::handle_schemas;
pub use stream::handle_stream;
