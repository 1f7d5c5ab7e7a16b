//! Timestamped backup copies of the usage log

use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Attempts at a unique name before giving up
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Filesystem-safe backup file name for a point in time
///
/// `2024-01-01T12:30:45.123Z` becomes
/// `app_usage_backup_2024-01-01T12-30-45-123Z.json`.
pub fn backup_file_name(at: DateTime<Utc>, attempt: u32) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    if attempt == 0 {
        format!("app_usage_backup_{}.json", stamp)
    } else {
        format!("app_usage_backup_{}-{}.json", stamp, attempt)
    }
}

/// Copy `source` byte-for-byte into a new file under `backup_dir`
///
/// Returns `None` when `source` does not exist. An existing backup is never
/// overwritten; a numeric suffix is appended instead.
pub fn create_backup(
    source: &Path,
    backup_dir: &Path,
    at: DateTime<Utc>,
) -> io::Result<Option<PathBuf>> {
    let mut src = match File::open(source) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    fs::create_dir_all(backup_dir)?;

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = backup_dir.join(backup_file_name(at, attempt));
        let mut dst = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        };
        if let Err(e) = copy_contents(&mut src, &mut dst) {
            drop(dst);
            // A partial copy must not pass for a backup
            if let Err(remove_err) = fs::remove_file(&path) {
                tracing::warn!(
                    "Failed to remove partial backup {}: {}",
                    path.display(),
                    remove_err
                );
            }
            return Err(e);
        }
        return Ok(Some(path));
    }

    Err(io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free backup name in {}", backup_dir.display()),
    ))
}

fn copy_contents(src: &mut File, dst: &mut File) -> io::Result<()> {
    io::copy(src, dst)?;
    dst.sync_all()
}
