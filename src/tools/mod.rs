//! External tools driven by the workflow
//!
//! Each collaborator sits behind a narrow trait so the orchestration logic
//! can run against fakes:
//! - [`BenchmarkEngine`]: `go test -bench`
//! - [`Comparator`]: `benchcmp` (or `benchstat`)
//! - [`ProfileViewer`]: `go tool pprof` plus an optional callgrind viewer

pub mod compare;
pub mod engine;
pub mod profile;

pub use compare::{Benchcmp, Comparator};
pub use engine::{BenchmarkEngine, GoTest};
pub use profile::{Pprof, ProfileRequest, ProfileViewer};

use std::process::ExitStatus;
use thiserror::Error;

/// Errors from launching or running an external tool
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{tool} not found: {source}")]
    NotFound {
        tool: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to launch {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}{detail}")]
    Failed {
        tool: String,
        status: ExitStatus,
        detail: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// A non-zero exit, with the tool's own diagnostics attached verbatim.
    pub fn failed(tool: &str, status: ExitStatus, output: &str) -> Self {
        let output = output.trim();
        let detail = if output.is_empty() {
            String::new()
        } else {
            format!(":\n{}", output)
        };
        ToolError::Failed {
            tool: tool.to_string(),
            status,
            detail,
        }
    }
}

/// Look up `tool`, mapping a miss to [`ToolError::NotFound`].
pub(crate) fn locate(tool: &str) -> Result<std::path::PathBuf, ToolError> {
    crate::util::find_tool(tool).map_err(|source| ToolError::NotFound {
        tool: tool.to_string(),
        source,
    })
}
