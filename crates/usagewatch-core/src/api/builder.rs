//! Builder for constructing a [`TrackerCore`] instance.
//!
//! ```ignore
//! let core = TrackerCoreBuilder::new(settings)
//!     .with_launcher(launcher)
//!     .build();
//! ```

use std::sync::Arc;

use crate::config::Settings;
use crate::state::{SharedState, TrackerState};
use crate::supervisor::{CommandLauncher, Supervisor, TrackerLauncher};

use super::core::TrackerCore;

/// Builder for constructing a [`TrackerCore`] Facade instance
pub struct TrackerCoreBuilder {
    settings: Arc<Settings>,
    state: Option<SharedState>,
    launcher: Option<Arc<dyn TrackerLauncher>>,
}

impl TrackerCoreBuilder {
    /// Create a new builder with the given settings
    pub fn new(settings: Settings) -> Self {
        Self::from_shared_settings(Arc::new(settings))
    }

    /// Create a new builder from an already-shared settings
    pub fn from_shared_settings(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            state: None,
            launcher: None,
        }
    }

    /// Use an existing shared state instead of creating a new one
    pub fn with_state(mut self, state: SharedState) -> Self {
        self.state = Some(state);
        self
    }

    /// Use a custom tracker launcher (demo mode, tests)
    pub fn with_launcher(mut self, launcher: Arc<dyn TrackerLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    /// Build the `TrackerCore` instance
    ///
    /// Without an explicit launcher, the `[tracker]` command from settings is used.
    pub fn build(self) -> TrackerCore {
        let state = self.state.unwrap_or_else(TrackerState::shared);
        let launcher: Arc<dyn TrackerLauncher> = match self.launcher {
            Some(launcher) => launcher,
            None => Arc::new(CommandLauncher::from_settings(&self.settings.tracker)),
        };

        TrackerCore::new(state, Supervisor::new(launcher), self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::testing::FakeLauncher;

    #[test]
    fn test_builder_defaults() {
        let core = TrackerCoreBuilder::new(Settings::default()).build();

        assert_eq!(core.settings().demo.interval_ms, 5000);
        assert!(!core.status().is_running);
    }

    #[test]
    fn test_builder_with_state() {
        let state = TrackerState::shared();
        let state_clone = state.clone();

        let core = TrackerCoreBuilder::new(Settings::default())
            .with_state(state)
            .build();

        assert!(Arc::ptr_eq(core.state(), &state_clone));
    }

    #[test]
    fn test_builder_with_launcher() {
        let launcher = Arc::new(FakeLauncher::default());
        let core = TrackerCoreBuilder::new(Settings::default())
            .with_launcher(launcher.clone())
            .build();

        core.start_tracking().unwrap();
        assert_eq!(
            launcher
                .launches
                .load(std::sync::atomic::Ordering::SeqCst),
            1
        );
    }

    #[test]
    fn test_builder_from_shared_settings() {
        let settings = Arc::new(Settings::default());
        let core = TrackerCoreBuilder::from_shared_settings(settings.clone()).build();

        assert_eq!(core.settings().web.port, settings.web.port);
    }
}
