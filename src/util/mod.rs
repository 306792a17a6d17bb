//! Utility functions and helpers

pub mod cmd;

pub use cmd::{find_tool, log_cmd};
