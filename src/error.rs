//! Workflow errors
//!
//! Every fallible step of a benchmark run returns [`BenchError`]. Only
//! `main` decides to terminate the process.

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::git::GitError;
use crate::tools::ToolError;

#[derive(Error, Debug)]
pub enum BenchError {
    /// Invalid or conflicting options, detected before any side effect
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Version-control state could not be determined
    #[error("failed to query repository state: {0}")]
    RevisionQuery(#[source] GitError),

    /// Checkout or stash failed; the working tree may need manual recovery
    #[error("failed to {action}: {source}")]
    RevisionMutation {
        action: String,
        #[source]
        source: GitError,
    },

    /// `go test` could not be launched or exited non-zero
    #[error("benchmark run for '{label}' failed: {source}")]
    BenchmarkExecution {
        label: String,
        #[source]
        source: ToolError,
    },

    /// The comparison tool or a profile viewer failed
    #[error(transparent)]
    ToolInvocation(#[from] ToolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BenchError {
    pub fn mutation(action: impl Into<String>, source: GitError) -> Self {
        BenchError::RevisionMutation {
            action: action.into(),
            source,
        }
    }

    pub fn benchmark(label: impl ToString, source: ToolError) -> Self {
        BenchError::BenchmarkExecution {
            label: label.to_string(),
            source,
        }
    }
}
