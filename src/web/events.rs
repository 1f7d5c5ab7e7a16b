//! Server-Sent Events for live tracker status

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;

use usagewatch_core::api::TrackerCore;
use usagewatch_core::status::TrackerStatus;

/// State for SSE handler
pub struct SseState {
    pub core: Arc<TrackerCore>,
    /// Comment interval keeping idle proxies from closing the stream
    pub keep_alive: Option<Duration>,
}

/// Serialize one status snapshot as an SSE `data:` payload
fn status_event(status: &TrackerStatus) -> Event {
    let json = serde_json::to_string(status).unwrap_or_else(|_| "{}".to_string());
    Event::default().data(json)
}

/// SSE stream of tracker status snapshots
///
/// Sends the current status on connect, then one snapshot per status change.
/// The broadcast subscription lives inside the response body, so a client
/// disconnect unsubscribes it.
pub async fn stream(State(state): State<Arc<SseState>>) -> Response {
    let events = state
        .core
        .status_stream()
        .map(|status| Ok::<_, Infallible>(status_event(&status)));

    tracing::debug!(
        "SSE client connected ({} subscribers)",
        state.core.subscriber_count()
    );

    let sse = Sse::new(events);
    match state.keep_alive {
        Some(interval) => sse
            .keep_alive(KeepAlive::new().interval(interval).text("keep-alive"))
            .into_response(),
        None => sse.into_response(),
    }
}
