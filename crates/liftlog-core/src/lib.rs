//! Shared building blocks for liftlog.
//!
//! Domain models, the error type, duration and number handling, calendar
//! helpers and configuration used by the data, runtime and binary crates.

pub mod data_processors;
pub mod duration;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{LiftlogError, Result};
