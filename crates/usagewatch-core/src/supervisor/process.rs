//! Launcher that runs the tracker as a real child process

use anyhow::{bail, Context, Result};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::process::{Child, Command, Stdio};

use crate::config::TrackerSettings;

use super::{TrackerHandle, TrackerLauncher};

/// Spawns the configured tracker command
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    command: Option<String>,
    args: Vec<String>,
}

impl CommandLauncher {
    /// Create a launcher for `command args...`
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: Some(command.into()),
            args,
        }
    }

    /// Build from `[tracker]` settings; launching fails if no command is set
    pub fn from_settings(settings: &TrackerSettings) -> Self {
        Self {
            command: settings.command.clone(),
            args: settings.args.clone(),
        }
    }
}

impl TrackerLauncher for CommandLauncher {
    fn launch(&self) -> Result<Box<dyn TrackerHandle>> {
        let Some(command) = self.command.as_deref() else {
            bail!("no tracker command configured");
        };

        let child = Command::new(command)
            .args(&self.args)
            .stdin(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to spawn tracker: {}", command))?;

        tracing::info!("Spawned tracker {} with PID {}", command, child.id());
        Ok(Box::new(ChildHandle { child: Some(child) }))
    }
}

/// Handle to a spawned tracker process
struct ChildHandle {
    /// Taken once the process has been signalled
    child: Option<Child>,
}

impl TrackerHandle for ChildHandle {
    fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    fn is_alive(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                tracing::info!("Tracker PID {} exited: {}", child.id(), status);
                false
            }
            Err(e) => {
                tracing::warn!("Failed to poll tracker PID {}: {}", child.id(), e);
                false
            }
        }
    }

    fn terminate(&mut self) -> Result<()> {
        let Some(child) = self.child.as_mut() else {
            return Ok(());
        };
        let pid = child.id();

        match signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            // Already gone; nothing left to signal
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to send SIGTERM to PID {}", pid))
            }
        }

        if let Some(mut child) = self.child.take() {
            // Reap off-thread so the exited tracker does not linger as a zombie
            std::thread::Builder::new()
                .name("tracker-reaper".to_string())
                .spawn(move || {
                    if let Ok(status) = child.wait() {
                        tracing::debug!("Tracker PID {} reaped: {}", pid, status);
                    }
                })
                .context("Failed to spawn reaper thread")?;
        }
        Ok(())
    }
}
