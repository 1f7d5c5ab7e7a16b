//! Action methods on [`TrackerCore`].
//!
//! These methods perform side-effects (launch/signal the tracker, record live
//! samples) and publish the matching [`TrackerEvent`].

use std::sync::Arc;
use std::time::Duration;

use crate::status::{Session, SystemMetrics};
use crate::supervisor::{StartOutcome, StopOutcome};

use super::core::TrackerCore;
use super::events::TrackerEvent;
use super::types::ApiError;

impl TrackerCore {
    // =========================================================
    // Tracker lifecycle
    // =========================================================

    /// Start the tracker.
    ///
    /// Fails with [`ApiError::AlreadyRunning`] without touching the status
    /// when a live tracker exists.
    pub fn start_tracking(&self) -> Result<(), ApiError> {
        let outcome = self
            .supervisor()
            .start(|| {
                self.state().write().set_running(true);
                self.emit(TrackerEvent::Started);
            })
            .map_err(ApiError::Launch)?;

        match outcome {
            StartOutcome::Started => {
                tracing::info!("Tracker started (pid={:?})", self.supervisor().pid());
                Ok(())
            }
            StartOutcome::AlreadyRunning => Err(ApiError::AlreadyRunning),
        }
    }

    /// Stop the tracker.
    ///
    /// Idempotent: with nothing running this returns
    /// [`StopOutcome::NotRunning`] and emits no event, unless the status
    /// still claimed a tracker that had exited on its own.
    pub fn stop_tracking(&self) -> Result<StopOutcome, ApiError> {
        // Set when the status still claimed a tracker that had already exited
        let mut stale = false;
        let outcome = self
            .supervisor()
            .stop(|outcome| {
                let mut state = self.state().write();
                if outcome == StopOutcome::NotRunning {
                    if !state.is_running() {
                        return;
                    }
                    stale = true;
                }
                state.set_running(false);
                drop(state);
                self.emit(TrackerEvent::Stopped);
            })
            .map_err(ApiError::Signal)?;

        match outcome {
            StopOutcome::Stopped => tracing::info!("Tracker stopped"),
            StopOutcome::NotRunning if stale => tracing::warn!("Tracker had already exited"),
            StopOutcome::NotRunning => tracing::debug!("Stop requested with no tracker running"),
        }
        Ok(outcome)
    }

    /// Mark the tracker stopped if it exited on its own
    ///
    /// Returns true when an exit was observed.
    pub fn reap_exited(&self) -> bool {
        let reaped = self.supervisor().reap_exited(|| {
            self.state().write().set_running(false);
            self.emit(TrackerEvent::Stopped);
        });
        if reaped {
            tracing::warn!("Tracker exited without a stop request");
        }
        reaped
    }

    // =========================================================
    // Live samples
    // =========================================================

    /// Replace the current session and metrics while the tracker runs
    ///
    /// Samples arriving while stopped are dropped (returns false).
    pub fn record_sample(&self, session: Session, metrics: SystemMetrics) -> bool {
        {
            let mut state = self.state().write();
            if !state.is_running() {
                return false;
            }
            state.set_sample(session, metrics);
        }
        self.emit(TrackerEvent::DataUpdated);
        true
    }
}

/// Periodically reap a tracker that exited on its own
///
/// The task ends once the core is dropped.
pub fn spawn_liveness_monitor(
    core: &Arc<TrackerCore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    let weak = Arc::downgrade(core);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(core) = weak.upgrade() else {
                break;
            };
            core.reap_exited();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::builder::TrackerCoreBuilder;
    use crate::config::Settings;
    use crate::status::{AppCategory, SessionMetadata};
    use crate::supervisor::testing::FakeLauncher;
    use chrono::{Local, Utc};
    use std::sync::atomic::Ordering;

    fn core_with_launcher() -> (TrackerCore, Arc<FakeLauncher>) {
        let launcher = Arc::new(FakeLauncher::default());
        let core = TrackerCoreBuilder::new(Settings::default())
            .with_launcher(launcher.clone())
            .build();
        (core, launcher)
    }

    fn sample() -> (Session, SystemMetrics) {
        let session = Session {
            session_id: "session_1".to_string(),
            app_name: "code.exe".to_string(),
            start: Utc::now(),
            window_title: "main.rs".to_string(),
            pid: 4242,
            category: AppCategory::Development,
            productivity_score: Some(9),
            idle_time: 0,
            switch_count: 1,
            metadata: SessionMetadata::from_start(&Local::now()),
        };
        let metrics = SystemMetrics {
            cpu_percent: 25.0,
            memory_mb: 4096,
            active_app: "code.exe".to_string(),
            window_title: "main.rs".to_string(),
            switch_count: 1,
            uptime_seconds: 60,
            productivity_score: 80,
        };
        (session, metrics)
    }

    #[tokio::test]
    async fn test_start_emits_started() {
        let (core, _) = core_with_launcher();
        let mut rx = core.subscribe();

        core.start_tracking().unwrap();

        assert!(core.status().is_running);
        assert_eq!(rx.recv().await.unwrap(), TrackerEvent::Started);
    }

    #[test]
    fn test_start_when_running_keeps_last_update() {
        let (core, launcher) = core_with_launcher();
        core.start_tracking().unwrap();
        let before = core.status().last_update;
        let mut rx = core.subscribe();

        let err = core.start_tracking().unwrap_err();
        assert!(matches!(err, ApiError::AlreadyRunning));
        assert_eq!(core.status().last_update, before);
        assert!(rx.try_recv().is_err());
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_when_stopped_is_idempotent() {
        let (core, _) = core_with_launcher();
        let before = core.status().last_update;
        let mut rx = core.subscribe();

        assert_eq!(core.stop_tracking().unwrap(), StopOutcome::NotRunning);
        assert_eq!(core.stop_tracking().unwrap(), StopOutcome::NotRunning);

        assert!(rx.try_recv().is_err());
        assert_eq!(core.status().last_update, before);
    }

    #[tokio::test]
    async fn test_stop_emits_stopped_once() {
        let (core, _) = core_with_launcher();
        core.start_tracking().unwrap();
        let mut rx = core.subscribe();

        assert_eq!(core.stop_tracking().unwrap(), StopOutcome::Stopped);
        assert_eq!(core.stop_tracking().unwrap(), StopOutcome::NotRunning);

        assert_eq!(rx.recv().await.unwrap(), TrackerEvent::Stopped);
        assert!(rx.try_recv().is_err());
        assert!(!core.status().is_running);
    }

    #[test]
    fn test_stop_after_self_exit_reports_stopped() {
        let (core, launcher) = core_with_launcher();
        core.start_tracking().unwrap();
        launcher.alive.store(false, Ordering::SeqCst);
        let mut rx = core.subscribe();

        assert_eq!(core.stop_tracking().unwrap(), StopOutcome::NotRunning);
        assert!(!core.status().is_running);
        assert_eq!(rx.try_recv().unwrap(), TrackerEvent::Stopped);
    }

    #[test]
    fn test_concurrent_start_stop_keeps_status_consistent() {
        let (core, _) = core_with_launcher();
        let core = Arc::new(core);

        for round in 0..200 {
            if round % 2 == 0 {
                core.start_tracking().unwrap();
            }
            let barrier = Arc::new(std::sync::Barrier::new(2));
            let starter = {
                let core = core.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    let _ = core.start_tracking();
                })
            };
            let stopper = {
                let core = core.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    core.stop_tracking().unwrap();
                })
            };
            starter.join().unwrap();
            stopper.join().unwrap();

            assert_eq!(
                core.status().is_running,
                core.supervisor().is_alive(),
                "status diverged from tracker handle in round {}",
                round
            );
        }
    }

    #[test]
    fn test_launch_failure_leaves_status() {
        let (core, launcher) = core_with_launcher();
        launcher.fail_launch.store(true, Ordering::SeqCst);
        let before = core.status();

        let err = core.start_tracking().unwrap_err();
        assert!(matches!(err, ApiError::Launch(_)));
        assert_eq!(core.status(), before);
    }

    #[test]
    fn test_signal_failure_leaves_status() {
        let (core, launcher) = core_with_launcher();
        core.start_tracking().unwrap();
        launcher.fail_terminate.store(true, Ordering::SeqCst);

        let err = core.stop_tracking().unwrap_err();
        assert!(matches!(err, ApiError::Signal(_)));
        assert!(core.status().is_running);
    }

    #[test]
    fn test_concurrent_starts_single_transition() {
        let (core, launcher) = core_with_launcher();
        let core = Arc::new(core);
        let mut rx = core.subscribe();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let core = core.clone();
                std::thread::spawn(move || core.start_tracking().is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
        assert_eq!(rx.try_recv().unwrap(), TrackerEvent::Started);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_reap_exited_marks_stopped() {
        let (core, launcher) = core_with_launcher();
        core.start_tracking().unwrap();
        let mut rx = core.subscribe();

        assert!(!core.reap_exited());
        launcher.alive.store(false, Ordering::SeqCst);
        assert!(core.reap_exited());

        assert!(!core.status().is_running);
        assert_eq!(rx.try_recv().unwrap(), TrackerEvent::Stopped);
    }

    #[test]
    fn test_record_sample_only_while_running() {
        let (core, _) = core_with_launcher();
        let (session, metrics) = sample();

        assert!(!core.record_sample(session.clone(), metrics.clone()));
        assert!(core.status().current_session.is_none());

        core.start_tracking().unwrap();
        let mut rx = core.subscribe();
        assert!(core.record_sample(session.clone(), metrics));

        let status = core.status();
        assert_eq!(status.current_session, Some(session));
        assert_eq!(rx.try_recv().unwrap(), TrackerEvent::DataUpdated);
    }

    #[tokio::test]
    async fn test_liveness_monitor_reaps() {
        let (core, launcher) = core_with_launcher();
        let core = Arc::new(core);
        core.start_tracking().unwrap();
        let mut rx = core.subscribe();

        let task = spawn_liveness_monitor(&core, Duration::from_millis(10));
        launcher.alive.store(false, Ordering::SeqCst);

        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("monitor did not reap")
            .unwrap();
        assert_eq!(event, TrackerEvent::Stopped);
        assert!(!core.status().is_running);

        drop(core);
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("monitor did not exit")
            .unwrap();
    }
}
