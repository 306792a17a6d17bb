//! Custom assertion helpers for gobench integration tests.

use std::path::Path;

use super::git_helpers;

/// Assert that a repo is on the expected branch.
pub fn assert_on_branch(repo_path: &Path, expected: &str) {
    let actual = git_helpers::current_branch(repo_path);
    assert_eq!(
        actual,
        expected,
        "Expected repo at {} to be on branch '{}', but was on '{}'",
        repo_path.display(),
        expected,
        actual
    );
}

/// Assert that the stash is empty.
pub fn assert_no_stash(repo_path: &Path) {
    let count = git_helpers::stash_count(repo_path);
    assert_eq!(
        count,
        0,
        "Expected no stash entries in {}, found {}",
        repo_path.display(),
        count
    );
}

/// Assert that a file exists and contains `needle`.
pub fn assert_file_contains(path: &Path, needle: &str) {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Expected file at {}: {}", path.display(), e));
    assert!(
        content.contains(needle),
        "Expected {} to contain {:?}, got:\n{}",
        path.display(),
        needle,
        content
    );
}
