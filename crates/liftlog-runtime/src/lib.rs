//! Runtime layer for liftlog.
//!
//! Loads workout data with retry, refreshes reports on an interval for the
//! watch view, and serves the HTTP API.

pub mod data_manager;
pub mod orchestrator;
pub mod server;

pub use liftlog_core as core;
pub use liftlog_data as data;
