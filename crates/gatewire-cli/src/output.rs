//! Output formatting and writing utilities
//!
//! This module formats command results as JSON, YAML or human-readable text,
//! with specialized rendering for the canonical completion envelope and the
//! schema listing.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use colored::Colorize;
use gatewire_core::ChatCompletion;
use serde::Serialize;
use std::io::{self, Write};
use tracing::{debug, trace};

/// Trait for formatting output values
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a canonical completion envelope
    fn format_completion(&self, completion: &ChatCompletion) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty | OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }

    fn format_completion(&self, completion: &ChatCompletion) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_completion_human(completion)),
            _ => self.format(completion),
        }
    }
}

fn format_completion_human(completion: &ChatCompletion) -> String {
    let mut lines = vec![
        format!("id:            {}", completion.id),
        format!("model:         {}", completion.model),
        format!("created:       {}", completion.created),
    ];
    for choice in &completion.choices {
        lines.push(format!(
            "choice {}:      [{}] {}",
            choice.index, choice.finish_reason, choice.message.content.as_deref().unwrap_or_default()
        ));
    }
    lines.push(format!(
        "usage:         prompt={} completion={} total={}",
        completion.usage.prompt_tokens, completion.usage.completion_tokens, completion.usage.total_tokens
    ));
    lines.join("\n")
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    verbose: u8,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, verbose: u8) -> Self {
        Self::with_writer(format, use_color, quiet, verbose, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        verbose: u8,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            verbose,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        if self.verbose > 1 {
            let value_json = serde_json::to_value(value)?;
            trace!("Outputting data: {}", redaction::redacted(&value_json));
        }

        let formatted = self.format.format(value)?;
        self.write_formatted(&formatted)
    }

    /// Write a canonical completion envelope
    pub fn completion(&mut self, completion: &ChatCompletion) -> Result<()> {
        let formatted = self.format.format_completion(completion)?;
        self.write_formatted(&formatted)
    }

    fn write_formatted(&mut self, formatted: &str) -> Result<()> {
        // YAML output already ends with a newline
        if formatted.ends_with('\n') {
            self.write(formatted)
        } else {
            self.writeln(formatted)
        }
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| match widths.get(i) {
                    Some(width) => format!("{:width$}", cell, width = *width),
                    None => cell.clone(),
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod capture;

#[cfg(test)]
mod tests;
