//! Logging setup for the storefront core.
//!
//! This crate provides:
//! - `LogLevel` / `LogFormat` - what to log and how
//! - `LogConfig` - the `[logging]` config section
//! - `init_logging` - installs the global `tracing` subscriber

mod logging;

pub use logging::*;
