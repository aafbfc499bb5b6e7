//! Core types shared by the Marionette crates.
//!
//! - [`errors`]: the [`MarionetteError`] type and [`Result`] alias
//! - [`import`]: data handed over by asset loaders
//! - [`version_tracker`]: change counters for CPU-side staging data
//! - [`time`]: fixed-step frame clock

pub mod errors;
pub mod import;
pub mod time;
pub mod version_tracker;

pub use errors::{MarionetteError, Result};
pub use time::FrameClock;
pub use version_tracker::{ChangeTracker, MutGuard};
