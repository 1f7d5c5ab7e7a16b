//! Core library for usagewatch.
//!
//! Owns the tracker status, supervises the external tracker process, watches
//! the usage log files it writes, and exposes everything through the
//! [`api::TrackerCore`] facade.

pub mod api;
pub mod config;
pub mod export;
pub mod state;
pub mod status;
pub mod supervisor;
pub mod usage;
pub mod watcher;
