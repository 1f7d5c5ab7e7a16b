use parking_lot::RwLock;
use std::sync::Arc;

use chrono::Utc;

use crate::status::{Session, SystemMetrics, TrackerStatus};

/// Shared state type alias
pub type SharedState = Arc<RwLock<TrackerState>>;

/// In-memory record of the last-known tracker status
#[derive(Debug, Default)]
pub struct TrackerState {
    status: TrackerStatus,
}

impl TrackerState {
    /// Create a new state with the tracker stopped
    pub fn new() -> Self {
        Self {
            status: TrackerStatus::new(),
        }
    }

    /// Create a shared state
    pub fn shared() -> SharedState {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Owned copy of the whole status
    pub fn snapshot(&self) -> TrackerStatus {
        self.status.clone()
    }

    /// Whether the tracker is marked running
    pub fn is_running(&self) -> bool {
        self.status.is_running
    }

    /// Record a start/stop transition and bump the timestamp
    pub fn set_running(&mut self, running: bool) {
        self.status.is_running = running;
        self.touch();
    }

    /// Replace the live sample wholesale
    pub fn set_sample(&mut self, session: Session, metrics: SystemMetrics) {
        self.status.current_session = Some(session);
        self.status.system_metrics = Some(metrics);
        self.touch();
    }

    fn touch(&mut self) {
        self.status.last_update = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_stopped() {
        let state = TrackerState::new();
        let snapshot = state.snapshot();
        assert!(!snapshot.is_running);
        assert!(snapshot.current_session.is_none());
        assert!(snapshot.system_metrics.is_none());
    }

    #[test]
    fn test_set_running_bumps_timestamp() {
        let mut state = TrackerState::new();
        let before = state.snapshot().last_update;
        std::thread::sleep(std::time::Duration::from_millis(2));
        state.set_running(true);
        let after = state.snapshot();
        assert!(after.is_running);
        assert!(after.last_update > before);
    }

    #[test]
    fn test_shared_state_is_same_arc() {
        let state = TrackerState::shared();
        let clone = state.clone();
        clone.write().set_running(true);
        assert!(state.read().is_running());
    }
}
