//! Data layer for liftlog.
//!
//! Reads workout CSV exports, groups sets into per-day summaries, derives
//! month statistics and goal progress, and runs the top-level report
//! pipeline.

pub mod aggregator;
pub mod analysis;
pub mod analyzer;
pub mod columns;
pub mod progress;
pub mod reader;

pub use liftlog_core as core;
