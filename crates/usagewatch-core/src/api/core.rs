//! TrackerCore: the Facade entry-point for all consumers (web, demo, tests)
//!
//! This struct owns every shared service and exposes high-level methods.
//! Consumers never need to acquire locks or wire services themselves.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::broadcast;

use crate::config::Settings;
use crate::state::SharedState;
use crate::supervisor::Supervisor;
use crate::watcher::{DataWatcher, WatchTargets};

use super::events::TrackerEvent;

/// Default broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The Facade that wraps all usagewatch-core services.
///
/// Constructed via [`TrackerCoreBuilder`](super::builder::TrackerCoreBuilder).
pub struct TrackerCore {
    /// Last-known tracker status
    state: SharedState,
    /// Owner of the tracker process handle
    supervisor: Supervisor,
    /// Application settings
    settings: Arc<Settings>,
    /// Broadcast sender for core events
    event_tx: broadcast::Sender<TrackerEvent>,
}

impl TrackerCore {
    /// Create a new TrackerCore instance (prefer `TrackerCoreBuilder`)
    pub(crate) fn new(state: SharedState, supervisor: Supervisor, settings: Arc<Settings>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state,
            supervisor,
            settings,
            event_tx,
        }
    }

    /// Access application settings (read-only)
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Live usage log path
    pub fn data_file(&self) -> PathBuf {
        self.settings.data_file.clone()
    }

    /// Aggregated stats file path
    pub fn stats_file(&self) -> PathBuf {
        self.settings.stats_file()
    }

    /// Start watching the usage log and stats file
    ///
    /// Changes are published as [`TrackerEvent::DataUpdated`] and
    /// [`TrackerEvent::StatsUpdated`] until the returned watcher is dropped.
    pub fn watch_files(&self) -> Result<DataWatcher> {
        let targets = WatchTargets::resolve(&self.data_file(), &self.stats_file())?;
        DataWatcher::start(targets, self.event_sender())
    }

    /// Get a clone of the broadcast event sender.
    pub(crate) fn event_sender(&self) -> broadcast::Sender<TrackerEvent> {
        self.event_tx.clone()
    }

    /// Publish an event; ignored when nobody listens
    pub(crate) fn emit(&self, event: TrackerEvent) {
        let _ = self.event_tx.send(event);
    }

    // =========================================================
    // Internal accessors for query/action impls
    // =========================================================

    /// Borrow the shared state (for query/action modules)
    pub(crate) fn state(&self) -> &SharedState {
        &self.state
    }

    /// Borrow the supervisor (for action modules)
    pub(crate) fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }
}
