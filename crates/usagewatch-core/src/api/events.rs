//! Core event system for push-based change notification.
//!
//! Tracker transitions, live samples, and file changes are published on a
//! `broadcast` channel. [`TrackerCore::status_stream()`] turns that channel
//! into a stream of status snapshots for streaming clients.

use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::status::TrackerStatus;

use super::core::TrackerCore;

/// Events emitted by the core when state changes occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerEvent {
    /// The tracker was started
    Started,
    /// The tracker was stopped or exited
    Stopped,
    /// The usage log changed or a new live sample was recorded
    DataUpdated,
    /// The aggregated stats file changed
    StatsUpdated,
}

impl TrackerEvent {
    /// Whether streaming clients get a fresh snapshot for this event
    pub fn refreshes_status(&self) -> bool {
        matches!(
            self,
            TrackerEvent::Started | TrackerEvent::Stopped | TrackerEvent::DataUpdated
        )
    }
}

impl TrackerCore {
    /// Subscribe to core events.
    ///
    /// If the receiver falls behind, older events are dropped (lagged).
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.event_sender().subscribe()
    }

    /// Number of live subscribers (streams included)
    pub fn subscriber_count(&self) -> usize {
        self.event_sender().receiver_count()
    }

    /// Notify subscribers that the usage log changed.
    ///
    /// Ignored if no subscribers are listening.
    pub fn notify_data_updated(&self) {
        let _ = self.event_sender().send(TrackerEvent::DataUpdated);
    }

    /// Stream of status snapshots: one immediately, then one per status-relevant event
    ///
    /// The subscription is taken before the first snapshot is read, so no
    /// transition between the two is missed. A lagged subscriber gets a single
    /// snapshot for all the events it skipped. Dropping the stream drops the
    /// subscription.
    pub fn status_stream(&self) -> impl Stream<Item = TrackerStatus> + Send + 'static {
        let rx = self.subscribe();
        let initial = self.status();
        let state = self.state().clone();

        let updates = BroadcastStream::new(rx).filter_map(move |item| {
            let refresh = match item {
                Ok(event) => event.refreshes_status(),
                Err(e) => {
                    tracing::debug!("Status stream {}", e);
                    true
                }
            };
            refresh.then(|| state.read().snapshot())
        });

        tokio_stream::once(initial).chain(updates)
    }
}
