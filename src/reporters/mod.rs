//! Output reporters for diagnoses and healing results
//!
//! Supports two output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON

mod json;
mod text;

use crate::engine::{Diagnosis, HealingResult};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown format '{0}'. Valid formats: text, json")]
pub struct UnknownFormat(String);

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a diagnosis in the specified format
pub fn render_diagnosis(
    diagnosis: &Diagnosis,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(text::render_diagnosis(diagnosis)),
        OutputFormat::Json => json::render_diagnosis(diagnosis),
    }
}

/// Render a healing result in the specified format
pub fn render_healing(
    file: Option<&str>,
    result: &HealingResult,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(text::render_healing(file, result)),
        OutputFormat::Json => json::render_healing(file, result),
    }
}
