//! Query methods on [`TrackerCore`].
//!
//! All methods return owned data. File reads go straight to the
//! tracker-written files, so a reply always reflects what is on disk.

use chrono::Utc;
use serde_json::Value;

use crate::export::{self, ExportFormat};
use crate::status::TrackerStatus;
use crate::usage;

use super::core::TrackerCore;
use super::types::{ApiError, BackupInfo, ExportReport};

impl TrackerCore {
    /// Snapshot of the tracker status, taken under a single read lock
    pub fn status(&self) -> TrackerStatus {
        self.state().read().snapshot()
    }

    /// Parsed usage log, `None` when the tracker has not written one
    pub fn tracker_data(&self) -> Result<Option<Value>, ApiError> {
        Ok(usage::read_json(&self.data_file())?)
    }

    /// Parsed stats file, `None` when the tracker has not written one
    pub fn tracker_stats(&self) -> Result<Option<Value>, ApiError> {
        Ok(usage::read_json(&self.stats_file())?)
    }

    /// Render the usage log for download, `None` when there is no data
    pub fn export_data(&self, format: ExportFormat) -> Result<Option<ExportReport>, ApiError> {
        let Some(log) = self.tracker_data()? else {
            return Ok(None);
        };

        let body = export::render(&log, format)?;
        let filename = format!(
            "usage_report_{}.{}",
            Utc::now().format("%Y-%m-%d"),
            format.extension()
        );
        Ok(Some(ExportReport {
            format,
            body,
            filename,
        }))
    }

    /// Like [`export_data`](Self::export_data) with the format given by name
    pub fn export_data_named(&self, format: &str) -> Result<Option<ExportReport>, ApiError> {
        let format: ExportFormat = format
            .parse()
            .map_err(|format| ApiError::UnsupportedFormat { format })?;
        self.export_data(format)
    }

    /// Copy the usage log to a new timestamped backup file
    ///
    /// Returns `None` when there is no usage log to back up.
    pub fn create_backup(&self) -> Result<Option<BackupInfo>, ApiError> {
        let backup_dir = self.settings().backup_dir();
        let created = export::create_backup(&self.data_file(), &backup_dir, Utc::now())
            .map_err(ApiError::Backup)?;

        if let Some(path) = &created {
            tracing::info!("Backup created: {}", path.display());
        }
        Ok(created.map(|path| BackupInfo { path }))
    }
}
