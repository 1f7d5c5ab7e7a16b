use serde_json::{Map, Value};
use std::path::PathBuf;

/// Failure while reading a tracker-written file
#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    /// The file exists but could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON (possibly caught mid-write)
    #[error("malformed JSON in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One application's aggregate as exported to CSV
///
/// Missing, null, empty, or zero fields fall back to the placeholders the
/// dashboard expects: `unknown`, `0`, `N/A`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppUsageRow {
    pub app_name: String,
    pub category: String,
    pub total_duration: String,
    pub total_sessions: String,
    pub last_used: String,
}

impl AppUsageRow {
    /// Build a row from an application entry of the usage log
    pub fn from_entry(app_name: &str, entry: &Value) -> Self {
        Self {
            app_name: app_name.to_string(),
            category: field_or(entry, "category", "unknown"),
            total_duration: field_or(entry, "total_duration", "0"),
            total_sessions: field_or(entry, "total_sessions", "0"),
            last_used: field_or(entry, "last_used", "N/A"),
        }
    }

    /// Fields in column order
    pub fn fields(&self) -> [&str; 5] {
        [
            self.app_name.as_str(),
            self.category.as_str(),
            self.total_duration.as_str(),
            self.total_sessions.as_str(),
            self.last_used.as_str(),
        ]
    }
}

/// Render a scalar field, treating falsy values as absent
fn field_or(entry: &Value, key: &str, default: &str) -> String {
    match entry.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) if n.as_f64().is_some_and(|v| v != 0.0) => n.to_string(),
        _ => default.to_string(),
    }
}

/// The per-application map of a usage log
///
/// The enhanced tracker nests it under `applications` next to `metadata`;
/// older logs are the map itself.
pub fn application_map(log: &Value) -> Option<&Map<String, Value>> {
    match log.get("applications") {
        Some(Value::Object(apps)) => Some(apps),
        _ => log.as_object(),
    }
}

/// CSV rows for every application in the log, in file order
pub fn usage_rows(log: &Value) -> Vec<AppUsageRow> {
    application_map(log)
        .map(|apps| {
            apps.iter()
                .map(|(name, entry)| AppUsageRow::from_entry(name, entry))
                .collect()
        })
        .unwrap_or_default()
}
