//! Web server module for dashboard clients
//!
//! Provides the REST API for tracker control and SSE for live status.

mod api;
mod events;
mod server;

pub use server::WebServer;
