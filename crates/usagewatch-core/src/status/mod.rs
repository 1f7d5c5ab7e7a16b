//! Tracker status model shared by the store, the stream, and the HTTP layer.

mod types;

pub use types::{AppCategory, Session, SessionMetadata, SystemMetrics, TimeOfDay, TrackerStatus};
