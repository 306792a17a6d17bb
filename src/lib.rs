//! gobench - benchmark Go packages across git revisions
//!
//! Runs `go test -bench` on a baseline (another branch, the stashed working
//! tree changes, or another toolchain) and on the current checkout, then
//! compares the results with `benchcmp` and optionally opens the profiles in
//! pprof.

pub mod cli;
pub mod core;
pub mod error;
pub mod git;
pub mod report;
pub mod runner;
pub mod telemetry;
pub mod tools;
pub mod util;

pub use core::config::RunConfig;
pub use error::BenchError;
pub use runner::{Plan, RunSummary, Runner};
