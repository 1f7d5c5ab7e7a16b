//! Read-only access to the files the tracker writes.
//!
//! Both files belong to the external tracker. A missing file means "no data
//! yet" and is never an error.

mod types;

use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;

pub use types::{application_map, usage_rows, AppUsageRow, UsageError};

/// Read and parse a tracker JSON file, `None` when it does not exist
pub fn read_json(path: &Path) -> Result<Option<Value>, UsageError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(UsageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| UsageError::Malformed {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_json(&dir.path().join("absent.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_read_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, r#"{"Chrome":{"category":"browser"}}"#).unwrap();

        let value = read_json(&path).unwrap().unwrap();
        assert_eq!(value["Chrome"]["category"], "browser");
    }

    #[test]
    fn test_read_truncated_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, r#"{"Chrome":{"categ"#).unwrap();

        let err = read_json(&path).unwrap_err();
        assert!(matches!(err, UsageError::Malformed { .. }));
    }
}
