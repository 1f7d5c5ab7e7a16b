//! Lifecycle of the single external tracker process.
//!
//! The [`Supervisor`] owns at most one [`TrackerHandle`]. Every transition
//! checks the handle and runs the caller's commit step under the same lock,
//! so two concurrent starts can never both succeed.

mod process;

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;

pub use process::CommandLauncher;

/// Starts a tracker and hands back a handle to it
pub trait TrackerLauncher: Send + Sync {
    fn launch(&self) -> Result<Box<dyn TrackerHandle>>;
}

/// A launched tracker
pub trait TrackerHandle: Send {
    /// OS process id, if the tracker is a real process that has not been signalled
    fn pid(&self) -> Option<u32>;

    /// Whether the tracker is still running
    fn is_alive(&mut self) -> bool;

    /// Ask the tracker to exit (SIGTERM for real processes)
    fn terminate(&mut self) -> Result<()>;
}

/// Result of a start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// Result of a stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    /// Nothing was running; the request was a no-op
    NotRunning,
}

/// Owner of the tracker process handle
pub struct Supervisor {
    launcher: Arc<dyn TrackerLauncher>,
    handle: Mutex<Option<Box<dyn TrackerHandle>>>,
}

impl Supervisor {
    /// Create a supervisor with nothing running
    pub fn new(launcher: Arc<dyn TrackerLauncher>) -> Self {
        Self {
            launcher,
            handle: Mutex::new(None),
        }
    }

    /// Launch the tracker unless one is already alive
    ///
    /// `commit` runs only after a successful launch, still under the lock.
    pub fn start(&self, commit: impl FnOnce()) -> Result<StartOutcome> {
        let mut guard = self.handle.lock();
        if let Some(handle) = guard.as_mut() {
            if handle.is_alive() {
                return Ok(StartOutcome::AlreadyRunning);
            }
        }

        let handle = self.launcher.launch()?;
        *guard = Some(handle);
        commit();
        Ok(StartOutcome::Started)
    }

    /// Terminate the tracker if one is alive
    ///
    /// `commit` runs under the lock with the outcome: after the signal was
    /// delivered, or once a dead or missing handle has been cleared. It does
    /// not run when signalling fails.
    pub fn stop(&self, commit: impl FnOnce(StopOutcome)) -> Result<StopOutcome> {
        let mut guard = self.handle.lock();
        let alive = match guard.as_mut() {
            Some(handle) => handle.is_alive(),
            None => false,
        };
        if !alive {
            *guard = None;
            commit(StopOutcome::NotRunning);
            return Ok(StopOutcome::NotRunning);
        }

        if let Some(handle) = guard.as_mut() {
            handle.terminate()?;
        }
        *guard = None;
        commit(StopOutcome::Stopped);
        Ok(StopOutcome::Stopped)
    }

    /// Clear the handle of a tracker that exited on its own
    ///
    /// Returns true (after running `commit`) only when an exit was observed.
    pub fn reap_exited(&self, commit: impl FnOnce()) -> bool {
        let mut guard = self.handle.lock();
        let exited = match guard.as_mut() {
            Some(handle) => !handle.is_alive(),
            None => false,
        };
        if exited {
            *guard = None;
            commit();
        }
        exited
    }

    /// Whether a live tracker handle is held
    pub fn is_alive(&self) -> bool {
        self.handle
            .lock()
            .as_mut()
            .is_some_and(|handle| handle.is_alive())
    }

    /// PID of the supervised process, if any
    pub fn pid(&self) -> Option<u32> {
        self.handle.lock().as_ref().and_then(|handle| handle.pid())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeLauncher;
    use super::*;
    use std::sync::atomic::Ordering;

    fn supervisor() -> (Supervisor, Arc<FakeLauncher>) {
        let launcher = Arc::new(FakeLauncher::default());
        (Supervisor::new(launcher.clone()), launcher)
    }

    #[test]
    fn test_start_then_already_running() {
        let (sup, launcher) = supervisor();
        let mut commits = 0;

        assert_eq!(sup.start(|| commits += 1).unwrap(), StartOutcome::Started);
        assert_eq!(
            sup.start(|| commits += 1).unwrap(),
            StartOutcome::AlreadyRunning
        );
        assert_eq!(commits, 1);
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
        assert!(sup.is_alive());
    }

    #[test]
    fn test_stop_when_nothing_running_is_noop() {
        let (sup, _) = supervisor();
        let mut seen = None;
        assert_eq!(
            sup.stop(|outcome| seen = Some(outcome)).unwrap(),
            StopOutcome::NotRunning
        );
        assert_eq!(seen, Some(StopOutcome::NotRunning));
    }

    #[test]
    fn test_stop_running_tracker() {
        let (sup, launcher) = supervisor();
        sup.start(|| {}).unwrap();

        let mut seen = None;
        assert_eq!(
            sup.stop(|outcome| seen = Some(outcome)).unwrap(),
            StopOutcome::Stopped
        );
        assert_eq!(seen, Some(StopOutcome::Stopped));
        assert!(!launcher.alive.load(Ordering::SeqCst));
        assert!(!sup.is_alive());
    }

    #[test]
    fn test_failed_launch_does_not_commit() {
        let (sup, launcher) = supervisor();
        launcher.fail_launch.store(true, Ordering::SeqCst);
        let mut committed = false;
        assert!(sup.start(|| committed = true).is_err());
        assert!(!committed);
        assert!(!sup.is_alive());
    }

    #[test]
    fn test_failed_terminate_keeps_handle() {
        let (sup, launcher) = supervisor();
        sup.start(|| {}).unwrap();
        launcher.fail_terminate.store(true, Ordering::SeqCst);

        let mut committed = false;
        assert!(sup.stop(|_| committed = true).is_err());
        assert!(!committed);
        assert!(sup.is_alive());
    }

    #[test]
    fn test_reap_exited_tracker() {
        let (sup, launcher) = supervisor();
        sup.start(|| {}).unwrap();
        assert!(!sup.reap_exited(|| {}));

        launcher.alive.store(false, Ordering::SeqCst);
        let mut committed = false;
        assert!(sup.reap_exited(|| committed = true));
        assert!(committed);
        // Second reap has nothing left to clear
        assert!(!sup.reap_exited(|| {}));
    }

    #[test]
    fn test_restart_after_self_exit() {
        let (sup, launcher) = supervisor();
        sup.start(|| {}).unwrap();
        launcher.alive.store(false, Ordering::SeqCst);

        assert_eq!(sup.start(|| {}).unwrap(), StartOutcome::Started);
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 2);
    }
}
