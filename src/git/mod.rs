//! Git operations
//!
//! The orchestrator only ever needs five things from version control; they
//! are collected in the [`VersionControl`] trait so the workflow can run
//! against a fake in tests. [`GitCli`] is the real implementation: queries go
//! through git2, mutations through the `git` binary so that its own output
//! can be echoed to the user.

use git2::{DiffOptions, ErrorCode, Oid, Repository};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

use crate::util::log_cmd;

/// Errors that can occur during git operations
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Not a git repository: {0}")]
    NotARepo(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Reference error: {0}")]
    Reference(String),
}

/// Version-control operations used by the benchmark workflow
pub trait VersionControl: Send + Sync {
    /// Name of the present checkout: the branch name, or the commit id when
    /// HEAD is detached.
    fn current_revision(&self) -> Result<String, GitError>;

    /// Whether tracked files differ from HEAD (staged or not). Untracked
    /// files and submodule contents are ignored, matching what
    /// `git stash push` saves.
    fn has_uncommitted_changes(&self) -> Result<bool, GitError>;

    /// Switch the working tree to `revision`. Returns git's output.
    fn checkout(&self, revision: &str) -> Result<String, GitError>;

    /// Shelve uncommitted changes. Returns git's output, or an error if
    /// nothing was shelved.
    fn stash_save(&self) -> Result<String, GitError>;

    /// Restore the most recently shelved changes. Returns git's output.
    fn stash_pop(&self) -> Result<String, GitError>;
}

/// [`VersionControl`] backed by git2 and the `git` CLI
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    /// Find the repository containing `path`.
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::discover(path)
            .map_err(|e| GitError::NotARepo(format!("{}: {}", path.display(), e)))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| {
                GitError::NotARepo(format!("{}: bare repository", path.display()))
            })?
            .to_path_buf();
        Ok(Self { workdir })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn open(&self) -> Result<Repository, GitError> {
        Repository::open(&self.workdir)
            .map_err(|e| GitError::NotARepo(format!("{}: {}", self.workdir.display(), e)))
    }

    /// Commit at the top of the stash, if any.
    fn stash_head(&self) -> Result<Option<Oid>, GitError> {
        let repo = self.open()?;
        match repo.refname_to_id("refs/stash") {
            Ok(oid) => Ok(Some(oid)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::Git(e)),
        }
    }

    /// Run a git command, returning its combined stdout and stderr.
    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.workdir);
        log_cmd(&cmd);
        let output = cmd
            .output()
            .map_err(|e| GitError::OperationFailed(format!("failed to run git: {}", e)))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        let text = text.trim().to_string();

        if !output.status.success() {
            return Err(GitError::OperationFailed(format!(
                "git {} failed: {}",
                args.join(" "),
                text
            )));
        }

        Ok(text)
    }
}

impl VersionControl for GitCli {
    fn current_revision(&self) -> Result<String, GitError> {
        let repo = self.open()?;
        let head = repo
            .head()
            .map_err(|e| GitError::Reference(e.to_string()))?;

        if head.is_branch() {
            head.shorthand()
                .map(str::to_string)
                .ok_or_else(|| GitError::Reference("branch name is not valid UTF-8".to_string()))
        } else {
            // Detached HEAD: the full id checks out to the same commit again
            let oid = head
                .target()
                .ok_or_else(|| GitError::Reference("HEAD has no target".to_string()))?;
            Ok(oid.to_string())
        }
    }

    fn has_uncommitted_changes(&self) -> Result<bool, GitError> {
        let repo = self.open()?;
        let tree = repo
            .head()
            .and_then(|head| head.peel_to_tree())
            .map_err(|e| GitError::Reference(e.to_string()))?;
        // Submodule contents are left alone by `git stash`, so they don't count
        let mut opts = DiffOptions::new();
        opts.ignore_submodules(true);
        let diff = repo.diff_tree_to_workdir_with_index(Some(&tree), Some(&mut opts))?;
        Ok(diff.deltas().len() > 0)
    }

    fn checkout(&self, revision: &str) -> Result<String, GitError> {
        tracing::info!(revision, "checkout");
        // Trailing `--` so a name matching only a path is an error, not a file restore
        self.run(&["checkout", revision, "--"])
    }

    fn stash_save(&self) -> Result<String, GitError> {
        tracing::info!("stash save");
        let before = self.stash_head()?;
        let out = self.run(&["stash", "push"])?;
        if self.stash_head()? == before {
            return Err(GitError::OperationFailed(format!(
                "git stash push saved nothing: {}",
                out
            )));
        }
        Ok(out)
    }

    fn stash_pop(&self) -> Result<String, GitError> {
        tracing::info!("stash pop");
        self.run(&["stash", "pop"])
    }
}
