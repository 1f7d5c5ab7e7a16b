//! Usage report export and usage log backups

mod backup;
mod table;

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub use backup::{backup_file_name, create_backup};
pub use table::{to_csv, CSV_HEADER};

/// Output format of a usage report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    /// File extension (also the `format` query value)
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// MIME type of the rendered report
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(other.to_string()),
        }
    }
}

/// Render a parsed usage log in the requested format
pub fn render(log: &Value, format: ExportFormat) -> Result<String, RenderError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(log)?),
        ExportFormat::Csv => Ok(to_csv(log)?),
    }
}

/// Failure while rendering a report
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("json rendering failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv rendering failed: {0}")]
    Csv(#[from] csv::Error),
}
