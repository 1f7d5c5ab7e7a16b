//! Public API layer (Facade) for usagewatch-core.
//!
//! This module provides [`TrackerCore`], a high-level entry-point that
//! encapsulates the state store, the process supervisor, the file watcher and
//! the exporter. Consumers (web server, demo generator) use this API instead of
//! operating on the shared state directly.
//!
//! # Quick Start
//!
//! ```ignore
//! use usagewatch_core::api::TrackerCoreBuilder;
//!
//! let core = TrackerCoreBuilder::new(settings).build();
//! core.start_tracking()?;
//! let status = core.status();
//! let mut rx = core.subscribe();
//! ```

mod actions;
mod builder;
mod core;
pub mod events;
mod queries;
pub mod types;

pub use actions::spawn_liveness_monitor;
pub use builder::TrackerCoreBuilder;
pub use core::TrackerCore;
pub use events::TrackerEvent;
pub use types::{ApiError, BackupInfo, ExportReport};
