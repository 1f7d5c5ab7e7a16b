use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use usagewatch_core::api::{spawn_liveness_monitor, TrackerCore, TrackerCoreBuilder};
use usagewatch_core::config::Settings;

use crate::web::WebServer;

/// Server application: wires the core, the file watcher, the background
/// tasks and the web server, and tears them down on shutdown.
pub struct App {
    core: Arc<TrackerCore>,
}

impl App {
    /// Create a new application
    pub fn new(settings: Settings) -> Self {
        Self {
            core: Arc::new(build_core(settings)),
        }
    }

    /// Shared core (for tests and embedding)
    pub fn core(&self) -> &Arc<TrackerCore> {
        &self.core
    }

    /// Run until Ctrl-C
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Run until `shutdown` resolves, then stop any running tracker
    pub async fn run_until(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let settings = self.core.settings();

        // The watcher stops when this guard is dropped
        let _watcher = self
            .core
            .watch_files()
            .context("Failed to watch tracker files")?;

        let monitor = spawn_liveness_monitor(
            &self.core,
            Duration::from_millis(settings.tracker.liveness_interval_ms),
        );

        let generator = self.start_demo_generator();

        let result = WebServer::new(self.core.clone()).run(shutdown).await;

        monitor.abort();
        if let Some(generator) = generator {
            generator.abort();
        }

        if let Err(e) = self.core.stop_tracking() {
            tracing::warn!("Failed to stop tracker on shutdown: {}", e);
        }
        tracing::info!("Server stopped");

        result
    }

    #[cfg(feature = "demo")]
    fn start_demo_generator(&self) -> Option<tokio::task::JoinHandle<()>> {
        let demo = &self.core.settings().demo;
        if !demo.enabled {
            return None;
        }
        let generator = crate::demo::MockGenerator::new(
            self.core.clone(),
            Duration::from_millis(demo.interval_ms),
        );
        Some(generator.start())
    }

    #[cfg(not(feature = "demo"))]
    fn start_demo_generator(&self) -> Option<tokio::task::JoinHandle<()>> {
        None
    }
}

/// Pick the launcher for the configured mode and build the core
fn build_core(settings: Settings) -> TrackerCore {
    let demo = settings.demo.enabled;
    let builder = TrackerCoreBuilder::new(settings);

    #[cfg(feature = "demo")]
    if demo {
        tracing::info!("Demo mode: tracker is simulated");
        return builder
            .with_launcher(Arc::new(crate::demo::SimulatedLauncher::new()))
            .build();
    }

    #[cfg(not(feature = "demo"))]
    if demo {
        tracing::warn!("Demo mode requested but this build has no demo support");
    }

    let core = builder.build();
    if core.settings().tracker.command.is_none() {
        tracing::warn!("No [tracker] command configured; start requests will fail");
    }
    core
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("Shutdown requested");
}
