//! External command helpers: verbose logging and binary lookup.

use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Log a command just before execution.
///
/// Emits a `tracing::debug!` event with the program name, arguments, and
/// working directory. Visible when running with `--verbose` (which sets
/// `gobench=debug`) or via `RUST_LOG=gobench::cmd=debug`.
pub fn log_cmd(cmd: &Command) {
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy()).collect();
    let cwd = cmd
        .get_current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    debug!(
        target: "gobench::cmd",
        %program,
        ?args,
        %cwd,
        "exec"
    );
}

/// Resolve an executable name or path to the binary that would be launched.
///
/// Bare names are searched on `PATH`; anything containing a path separator
/// is checked as given.
pub fn find_tool(name: &str) -> Result<PathBuf, which::Error> {
    let path = which::which(name)?;
    debug!(target: "gobench::cmd", tool = name, path = %path.display(), "resolved");
    Ok(path)
}
