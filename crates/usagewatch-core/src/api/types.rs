//! Error and report types returned by [`TrackerCore`](super::TrackerCore)

use std::path::PathBuf;

use crate::export::{ExportFormat, RenderError};
use crate::usage::UsageError;

/// Errors from tracker control and data access
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A start was requested while a tracker is alive
    #[error("tracker is already running")]
    AlreadyRunning,

    /// The export format is not one of json/csv
    #[error("unsupported export format: {format}")]
    UnsupportedFormat { format: String },

    /// The tracker process could not be launched
    #[error("failed to launch tracker: {0:#}")]
    Launch(#[source] anyhow::Error),

    /// The tracker process could not be signalled
    #[error("failed to stop tracker: {0:#}")]
    Signal(#[source] anyhow::Error),

    /// A tracker file exists but could not be read or parsed
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// Report rendering failed
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Backup copy failed
    #[error("backup failed: {0}")]
    Backup(#[source] std::io::Error),
}

impl ApiError {
    /// Whether the caller can fix this by changing the request or tracker state
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::AlreadyRunning | ApiError::UnsupportedFormat { .. }
        )
    }
}

/// A rendered usage report ready for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub format: ExportFormat,
    pub body: String,
    /// `usage_report_<YYYY-MM-DD>.<ext>`
    pub filename: String,
}

/// Location of a freshly created backup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub path: PathBuf,
}
