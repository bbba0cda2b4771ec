pub mod alarm;
pub mod app;
pub mod config;
pub mod dirs;
pub mod session_log;
pub mod timer;
pub mod ui;

use std::time::Duration;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Display refresh cadence; the engine itself tracks time exactly.
pub const TICK_RATE: Duration = Duration::from_millis(500);
