//! Profile viewing via `go tool pprof`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::{locate, ToolError};
use crate::core::config::{ProfileKind, RunConfig};
use crate::core::output_dir::OutputDir;
use crate::core::revision::RunLabel;
use crate::util::log_cmd;

/// Functions matching this are dropped from every report.
const IGNORE_RUNTIME: &str = "-ignore=runtime\\.";

/// What to show: the current profile, optionally relative to a baseline
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRequest {
    pub kind: ProfileKind,
    pub profile: PathBuf,
    /// Subtracted from `profile` (pprof `-base`)
    pub base_profile: Option<PathBuf>,
    pub sample_index: Option<String>,
    /// Export here in callgrind format instead of opening pprof interactively
    pub callgrind: Option<PathBuf>,
}

impl ProfileRequest {
    /// Build the request for `current`, diffed against `base` when one ran.
    /// Returns `None` when profiling is off.
    pub fn new(
        config: &RunConfig,
        out_dir: &OutputDir,
        base: Option<&RunLabel>,
        current: &RunLabel,
    ) -> Option<Self> {
        let kind = config.profile?;
        Some(Self {
            kind,
            profile: out_dir.profile_file(current),
            base_profile: base.map(|label| out_dir.profile_file(label)),
            sample_index: config.prof_sample_index.clone(),
            callgrind: config.prof_callgrind.then(|| out_dir.callgrind_file()),
        })
    }

    /// Arguments for `go`, starting with `tool pprof`
    pub fn pprof_args(&self) -> Vec<String> {
        let mut args = vec![
            "tool".to_string(),
            "pprof".to_string(),
            IGNORE_RUNTIME.to_string(),
        ];

        if let Some(base) = &self.base_profile {
            args.push("-base".to_string());
            args.push(base.display().to_string());
        }

        match (&self.sample_index, self.kind) {
            (Some(index), _) => args.push(format!("-sample_index={}", index)),
            (None, ProfileKind::Memory) => args.push("-sample_index=alloc_objects".to_string()),
            (None, _) => {}
        }

        if let Some(out) = &self.callgrind {
            args.push("-callgrind".to_string());
            args.push("-output".to_string());
            args.push(out.display().to_string());
        }

        args.push(self.profile.display().to_string());
        args
    }
}

/// Presents a profile to the user
#[async_trait]
pub trait ProfileViewer: Send + Sync {
    async fn show(&self, request: &ProfileRequest) -> Result<(), ToolError>;
}

/// [`ProfileViewer`] running pprof from the Go toolchain
#[derive(Debug, Clone)]
pub struct Pprof {
    go_exe: String,
    callgrind_viewer: String,
}

impl Pprof {
    pub fn new(go_exe: impl Into<String>, callgrind_viewer: impl Into<String>) -> Self {
        Self {
            go_exe: go_exe.into(),
            callgrind_viewer: callgrind_viewer.into(),
        }
    }

    /// Run `exe args` attached to the terminal and wait for it to exit.
    async fn run_attached(&self, tool: &str, args: &[String]) -> Result<(), ToolError> {
        let exe = locate(tool)?;
        let mut cmd = Command::new(&exe);
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        log_cmd(cmd.as_std());

        let status = cmd
            .spawn()
            .map_err(|source| ToolError::Launch {
                tool: tool.to_string(),
                source,
            })?
            .wait()
            .await?;

        if !status.success() {
            return Err(ToolError::failed(tool, status, ""));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileViewer for Pprof {
    async fn show(&self, request: &ProfileRequest) -> Result<(), ToolError> {
        self.run_attached(&self.go_exe, &request.pprof_args()).await?;

        if let Some(callgrind) = &request.callgrind {
            let path = callgrind.display().to_string();
            self.run_attached(&self.callgrind_viewer, &[path]).await?;
        }
        Ok(())
    }
}

/// Whether `path` exists; pprof fails with a confusing message otherwise.
pub fn profile_exists(path: &Path) -> bool {
    path.is_file()
}
