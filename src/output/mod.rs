//! Output surfaces for analysis results.
//!
//! There are two audiences with different disclosure rules:
//!
//! - the human console report ([`print_cli_report`]) may show allowlist
//!   reasons and notes, advisory titles and URLs
//! - the log channel ([`log_summary`]) carries only package, id, severity and
//!   allowlist status

mod cli;
mod log;

pub use cli::print_cli_report;
pub use log::{log_summary, LogRecord};

use crate::model::AnalysisResult;
use anyhow::Result;

/// Output format for analysis results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format for programmatic use
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'table' or 'json'", s)),
        }
    }
}

pub fn print_result(result: &AnalysisResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_report(result),
        OutputFormat::Json => print_json(result),
    }
}

pub fn print_json(result: &AnalysisResult) -> Result<()> {
    println!("{}", format_result_to_string(result)?);
    Ok(())
}

/// Format result to string for file output
pub fn format_result_to_string(result: &AnalysisResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
