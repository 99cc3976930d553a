//! Output formatting module
//!
//! Renders one [`ErrorRecord`] into the machine log form, the colorized
//! console form, and the CLI-facing JSON/YAML/summary formats.

pub mod ansi;
mod json;
mod yaml;

pub use ansi::format_console;
pub use json::format_log_text;
pub use yaml::format_yaml;

use crate::models::{ErrorRecord, RenderedError, StackInfo};
use thiserror::Error;

/// Output format errors
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Available output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty JSON record
    #[default]
    Json,
    /// YAML record
    Yaml,
    /// Colorized console text
    Ansi,
    /// Plain text summary
    Summary,
}

/// Produce both renderings of a record
pub fn render(record: ErrorRecord) -> RenderedError {
    let log_text = json::format_log_text(&record);
    let console_text = ansi::format_console(&record);
    RenderedError {
        record,
        log_text,
        console_text,
    }
}

/// Format a record in the requested CLI format
pub fn format_output(record: &ErrorRecord, format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(record).map_err(FormatError::from),
        OutputFormat::Yaml => yaml::format_yaml(record),
        OutputFormat::Ansi => Ok(ansi::format_console(record)),
        OutputFormat::Summary => Ok(format_summary(record)),
    }
}

/// Plain text summary without styling
fn format_summary(record: &ErrorRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Name: {}\n", record.name));
    output.push_str(&format!("Message: {}\n", record.message));

    match &record.stack {
        StackInfo::Frames(frames) => {
            output.push_str(&format!("Frames: {}\n", frames.len()));
            for entry in frames {
                output.push_str(&format!("  {}:{} ({})\n", entry.file, entry.line, entry.at));
            }
        }
        StackInfo::Text(text) => {
            output.push_str(&format!("Stack: {}\n", text));
        }
    }

    if !record.params.is_empty() {
        output.push_str(&format!("Params: {}\n", record.params));
    }

    output
}
