//! CLI layer
//!
//! Command-line interface using clap.

pub mod args;
pub mod output;

pub use args::BenchArgs;
pub use output::Output;
