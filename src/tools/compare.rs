//! Statistical comparison of two result files

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

use super::{locate, ToolError};
use crate::util::log_cmd;

/// Compares the benchmark records of a baseline and a current run
#[async_trait]
pub trait Comparator: Send + Sync {
    /// Returns the tool's report text.
    async fn compare(&self, old: &Path, new: &Path) -> Result<String, ToolError>;
}

/// [`Comparator`] that shells out to `benchcmp`.
///
/// `benchstat` is accepted as a drop-in; it takes no `-best` flag.
#[derive(Debug, Clone)]
pub struct Benchcmp {
    exe: String,
}

impl Benchcmp {
    pub fn new(exe: impl Into<String>) -> Self {
        Self { exe: exe.into() }
    }

    fn is_benchstat(&self) -> bool {
        Path::new(&self.exe)
            .file_stem()
            .map(|stem| stem.to_string_lossy().starts_with("benchstat"))
            .unwrap_or(false)
    }

    /// Arguments passed to the tool for the two files
    pub fn args(&self, old: &Path, new: &Path) -> Vec<String> {
        let mut args = Vec::with_capacity(3);
        if !self.is_benchstat() {
            // Keep the best of the repeated runs
            args.push("-best".to_string());
        }
        args.push(old.display().to_string());
        args.push(new.display().to_string());
        args
    }
}

#[async_trait]
impl Comparator for Benchcmp {
    async fn compare(&self, old: &Path, new: &Path) -> Result<String, ToolError> {
        let exe = locate(&self.exe)?;
        let mut cmd = Command::new(&exe);
        cmd.args(self.args(old, new));
        log_cmd(cmd.as_std());

        let output = cmd.output().await.map_err(|source| ToolError::Launch {
            tool: self.exe.clone(),
            source,
        })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(ToolError::failed(&self.exe, output.status, &text));
        }
        Ok(text)
    }
}
