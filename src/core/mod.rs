//! Core types: configuration, revision labels and output files

pub mod config;
pub mod output_dir;
pub mod revision;
pub mod settings;

pub use config::{ConfigError, ProfileKind, RunConfig};
pub use output_dir::OutputDir;
pub use revision::{Revision, RunLabel};
pub use settings::Settings;
