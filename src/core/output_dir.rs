//! Output directory holding the per-run result and profile files.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

use super::revision::RunLabel;

/// Name of the callgrind export written when `--prof-callgrind` is set.
pub const CALLGRIND_FILE: &str = "callgrind.out";

/// Owns every file produced by one invocation.
///
/// An auto-allocated directory is removed when this value is dropped; a
/// user-supplied directory is never removed.
#[derive(Debug)]
pub struct OutputDir {
    path: PathBuf,
    temp: Option<TempDir>,
}

impl OutputDir {
    /// Use `explicit` if given (creating it if needed), otherwise allocate a
    /// fresh temporary directory.
    pub fn prepare(explicit: Option<&Path>) -> std::io::Result<Self> {
        match explicit {
            Some(path) => Self::user(path),
            None => Self::temporary(),
        }
    }

    pub fn temporary() -> std::io::Result<Self> {
        let temp = tempfile::Builder::new().prefix("gobench").tempdir()?;
        debug!(path = %temp.path().display(), "allocated output directory");
        Ok(Self {
            path: temp.path().to_path_buf(),
            temp: Some(temp),
        })
    }

    pub fn user(path: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            temp: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the directory is removed on drop
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    pub fn bench_file(&self, label: &RunLabel) -> PathBuf {
        self.path.join(label.bench_file_name())
    }

    pub fn profile_file(&self, label: &RunLabel) -> PathBuf {
        self.path.join(label.profile_file_name())
    }

    pub fn callgrind_file(&self) -> PathBuf {
        self.path.join(CALLGRIND_FILE)
    }
}

impl Drop for OutputDir {
    fn drop(&mut self) {
        if let Some(temp) = self.temp.take() {
            let path = temp.path().to_path_buf();
            if let Err(e) = temp.close() {
                warn!(path = %path.display(), error = %e, "failed to remove output directory");
            }
        }
    }
}
