//! Web server implementation using axum

use anyhow::{Context, Result};
use axum::http::{HeaderName, Method};
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use usagewatch_core::api::TrackerCore;

use super::api::{self, ApiState};
use super::events::{self, SseState};

/// HTTP front end for the tracker core
pub struct WebServer {
    core: Arc<TrackerCore>,
}

impl WebServer {
    /// Create a new web server
    pub fn new(core: Arc<TrackerCore>) -> Self {
        Self { core }
    }

    /// All routes, nested under `/api`, with CORS applied
    pub fn router(&self) -> Router {
        let web = &self.core.settings().web;

        let api_state = Arc::new(ApiState {
            core: self.core.clone(),
        });

        let sse_state = Arc::new(SseState {
            core: self.core.clone(),
            keep_alive: web.sse_keep_alive_secs.map(Duration::from_secs),
        });

        // The dashboard is served from another origin
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([HeaderName::from_static("content-type")]);

        let api_routes = Router::new()
            .route("/ping", get(api::ping))
            .route("/tracker/status", get(api::get_status))
            .route("/tracker/start", post(api::start_tracker))
            .route("/tracker/stop", post(api::stop_tracker))
            .route("/tracker/data", get(api::get_data))
            .route("/tracker/stats", get(api::get_stats))
            .route("/tracker/export", get(api::export_data))
            .route("/tracker/backup", post(api::create_backup))
            .with_state(api_state);

        let events_routes = Router::new()
            .route("/tracker/stream", get(events::stream))
            .with_state(sse_state);

        Router::new()
            .nest("/api", api_routes)
            .nest("/api", events_routes)
            .layer(cors)
    }

    /// Serve until `shutdown` resolves
    pub async fn run(self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
        let port = self.core.settings().web.port;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind web server to {}", addr))?;
        tracing::info!("Web server listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
