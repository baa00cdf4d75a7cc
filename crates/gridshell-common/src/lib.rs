//! Shared utilities used across gridshell crates.
//!
//! Provides terminal color handling and tracing setup.

#![deny(clippy::all)]

mod color;
mod telemetry;

pub use color::Colors;
pub use color::init as color_init;
pub use telemetry::LogConfig;
pub use telemetry::TelemetryGuard;
pub use telemetry::init_tracing;
