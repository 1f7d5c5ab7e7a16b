use anyhow::Result;

use usagewatch_core::supervisor::{TrackerHandle, TrackerLauncher};

/// Launcher that "runs" a tracker without spawning a process
///
/// Start/stop go through the real supervisor, so demo mode exercises the same
/// transitions and events as a real tracker.
#[derive(Debug, Default)]
pub struct SimulatedLauncher;

impl SimulatedLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl TrackerLauncher for SimulatedLauncher {
    fn launch(&self) -> Result<Box<dyn TrackerHandle>> {
        tracing::debug!("Starting simulated tracker");
        Ok(Box::new(SimulatedHandle { alive: true }))
    }
}

/// Handle to a simulated tracker; alive until terminated
struct SimulatedHandle {
    alive: bool,
}

impl TrackerHandle for SimulatedHandle {
    fn pid(&self) -> Option<u32> {
        None
    }

    fn is_alive(&mut self) -> bool {
        self.alive
    }

    fn terminate(&mut self) -> Result<()> {
        self.alive = false;
        Ok(())
    }
}
