//! Logging setup for gobench.
//!
//! Diagnostics use the `tracing` crate and are written to stderr so they
//! never mix with benchmark records on stdout.
//!
//! # Feature Flags
//!
//! - `release-logs`: Strip debug/trace at compile time
//! - `max-perf`: Disable all tracing

mod init;

pub use init::{init_telemetry, TelemetryConfig, TelemetryGuard};
