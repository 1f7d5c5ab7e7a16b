//! usagewatch: HTTP control server for an external screen-time tracker.
//!
//! The tracker logic lives in `usagewatch-core`; this crate adds the web
//! front end, demo mode, and the application wiring.

pub mod app;
#[cfg(feature = "demo")]
pub mod demo;
pub mod web;
