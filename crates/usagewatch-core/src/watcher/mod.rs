//! Change notification for the tracker's output files.
//!
//! Watches the directories containing the usage log and the stats file
//! instead of the files themselves, so a file the tracker creates after
//! startup (or replaces through write-then-rename) is still observed.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;

use crate::api::TrackerEvent;

/// Resolved absolute paths of the two watched files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTargets {
    pub data_file: PathBuf,
    pub stats_file: PathBuf,
}

impl WatchTargets {
    /// Resolve both files against canonical parent directories
    ///
    /// Parent directories are created when missing.
    pub fn resolve(data_file: &Path, stats_file: &Path) -> Result<Self> {
        Ok(Self {
            data_file: resolve_target(data_file)?,
            stats_file: resolve_target(stats_file)?,
        })
    }

    /// Distinct directories to watch
    fn directories(&self) -> BTreeSet<PathBuf> {
        [&self.data_file, &self.stats_file]
            .into_iter()
            .filter_map(|p| p.parent().map(Path::to_path_buf))
            .collect()
    }

    /// Map a filesystem event onto tracker events
    pub fn classify(&self, event: &Event) -> Vec<TrackerEvent> {
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return Vec::new();
        }

        let mut out = Vec::new();
        if event.paths.iter().any(|p| p == &self.data_file) {
            out.push(TrackerEvent::DataUpdated);
        }
        if event.paths.iter().any(|p| p == &self.stats_file) {
            out.push(TrackerEvent::StatsUpdated);
        }
        out
    }
}

fn resolve_target(file: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(file)
        .with_context(|| format!("Failed to resolve path: {}", file.display()))?;
    let name = absolute
        .file_name()
        .with_context(|| format!("Not a file path: {}", file.display()))?
        .to_owned();
    let dir = absolute
        .parent()
        .with_context(|| format!("No parent directory: {}", file.display()))?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
    let dir = dir
        .canonicalize()
        .with_context(|| format!("Failed to canonicalize: {}", dir.display()))?;

    Ok(dir.join(name))
}

/// Active watch on the tracker files; dropping it stops notifications
pub struct DataWatcher {
    _watcher: RecommendedWatcher,
    targets: WatchTargets,
}

impl DataWatcher {
    /// Start watching and publish matching changes on `tx`
    pub fn start(targets: WatchTargets, tx: broadcast::Sender<TrackerEvent>) -> Result<Self> {
        let classify_targets = targets.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for tracker_event in classify_targets.classify(&event) {
                        // No subscribers is fine
                        let _ = tx.send(tracker_event);
                    }
                }
                Err(e) => tracing::warn!("File watch error: {}", e),
            },
            notify::Config::default(),
        )
        .context("Failed to create file watcher")?;

        for dir in targets.directories() {
            watcher
                .watch(&dir, RecursiveMode::NonRecursive)
                .with_context(|| format!("Failed to watch directory: {}", dir.display()))?;
            tracing::debug!("Watching {}", dir.display());
        }

        tracing::info!(
            "Watching usage log {} and stats {}",
            targets.data_file.display(),
            targets.stats_file.display()
        );

        Ok(Self {
            _watcher: watcher,
            targets,
        })
    }

    /// Paths being watched
    pub fn targets(&self) -> &WatchTargets {
        &self.targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind};
    use std::time::Duration;

    fn targets(dir: &Path) -> WatchTargets {
        WatchTargets::resolve(
            &dir.join("app_usage_log.json"),
            &dir.join("app_usage_log.stats.json"),
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("not/yet/there");
        let t = WatchTargets::resolve(&nested.join("log.json"), &nested.join("stats.json"))
            .unwrap();
        assert!(nested.is_dir());
        assert!(t.data_file.is_absolute());
        assert_eq!(t.directories().len(), 1);
    }

    #[test]
    fn test_classify_matches_files() {
        let dir = tempfile::tempdir().unwrap();
        let t = targets(dir.path());

        let modify = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(t.data_file.clone());
        assert_eq!(t.classify(&modify), vec![TrackerEvent::DataUpdated]);

        let create =
            Event::new(EventKind::Create(CreateKind::File)).add_path(t.stats_file.clone());
        assert_eq!(t.classify(&create), vec![TrackerEvent::StatsUpdated]);
    }

    #[test]
    fn test_classify_ignores_other_files_and_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let t = targets(dir.path());

        let other = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(t.data_file.with_file_name("unrelated.json"));
        assert!(t.classify(&other).is_empty());

        let access = Event::new(EventKind::Access(AccessKind::Any)).add_path(t.data_file.clone());
        assert!(t.classify(&access).is_empty());
    }

    #[tokio::test]
    async fn test_file_created_after_start_is_observed() {
        let dir = tempfile::tempdir().unwrap();
        let t = targets(dir.path());
        let (tx, mut rx) = broadcast::channel(64);

        let watcher = DataWatcher::start(t.clone(), tx).unwrap();
        assert!(!t.data_file.exists());

        std::fs::write(&t.data_file, "{}").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match rx.recv().await {
                    Ok(TrackerEvent::DataUpdated) => return TrackerEvent::DataUpdated,
                    Ok(_) => continue,
                    Err(e) => panic!("channel error: {}", e),
                }
            }
        })
        .await
        .expect("no change notification for new file");

        assert_eq!(event, TrackerEvent::DataUpdated);
        drop(watcher);
    }
}
