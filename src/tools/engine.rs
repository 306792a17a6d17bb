//! Benchmark engine
//!
//! Runs `go test` and duplicates its standard output line by line to the
//! terminal and to the run's result file.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;

use super::{locate, ToolError};
use crate::util::log_cmd;

/// Executes benchmarks for one revision
#[async_trait]
pub trait BenchmarkEngine: Send + Sync {
    /// The toolchain's version banner (`go version`)
    async fn version(&self, go_exe: &str) -> Result<String, ToolError>;

    /// Run the toolchain with `args`, writing its standard output to both the
    /// terminal and `results`. The file is complete when this returns,
    /// whether or not the run succeeded.
    async fn run(&self, go_exe: &str, args: &[String], results: &Path) -> Result<(), ToolError>;
}

/// [`BenchmarkEngine`] backed by the Go toolchain
#[derive(Debug, Default, Clone, Copy)]
pub struct GoTest;

#[async_trait]
impl BenchmarkEngine for GoTest {
    async fn version(&self, go_exe: &str) -> Result<String, ToolError> {
        let exe = locate(go_exe)?;
        let mut cmd = Command::new(&exe);
        cmd.arg("version");
        log_cmd(cmd.as_std());

        let output = cmd.output().await.map_err(|source| ToolError::Launch {
            tool: go_exe.to_string(),
            source,
        })?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ToolError::failed(go_exe, output.status, &stderr));
        }
        Ok(stdout)
    }

    async fn run(&self, go_exe: &str, args: &[String], results: &Path) -> Result<(), ToolError> {
        let exe = locate(go_exe)?;
        let mut file = tokio::fs::File::create(results).await?;

        let mut cmd = Command::new(&exe);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        log_cmd(cmd.as_std());

        let mut child = cmd.spawn().map_err(|source| ToolError::Launch {
            tool: go_exe.to_string(),
            source,
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("child stdout was not captured"))?;

        let copied = tee(stdout, &mut tokio::io::stdout(), &mut file).await;
        if copied.is_err() {
            // The child would block on a full pipe otherwise
            let _ = child.kill().await;
        }
        file.flush().await?;
        let status = child.wait().await?;
        let bytes = copied?;
        tracing::debug!(results = %results.display(), bytes, %status, "benchmark finished");

        if !status.success() {
            return Err(ToolError::failed(go_exe, status, ""));
        }
        Ok(())
    }
}

/// Copy `reader` to both writers, one line at a time, flushing the terminal
/// side after every line so output appears live.
pub async fn tee<R, A, B>(reader: R, terminal: &mut A, file: &mut B) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
    A: AsyncWrite + Unpin,
    B: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    let mut total = 0u64;

    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line).await?;
        if n == 0 {
            break;
        }
        terminal.write_all(&line).await?;
        terminal.flush().await?;
        file.write_all(&line).await?;
        total += n as u64;
    }

    file.flush().await?;
    Ok(total)
}
