//! Test fixtures: a two-branch repository plus fake `go` and `benchcmp`
//! executables.
//!
//! The fake `go` appends one line per invocation to `go.log` recording the
//! checked-out branch, whether the tree was clean, and its arguments.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::git_helpers;

/// Path of the tracked benchmark source inside the fixture repo.
pub const BENCH_SOURCE: &str = "testing/sleep_test.go";

/// Contents of [`BENCH_SOURCE`] on `main`.
pub const MAIN_SOURCE: &str = "package testing\n\n// BenchmarkSleep sleeps.\n";

/// A repository on `main` with a `testing` branch one commit ahead.
pub struct BenchFixture {
    _temp: TempDir,
    pub repo: PathBuf,
    pub bin_dir: PathBuf,
}

impl BenchFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        let bin_dir = temp.path().join("bin");
        fs::create_dir_all(&bin_dir).unwrap();

        git_helpers::init_repo(&repo);
        git_helpers::commit_file(&repo, BENCH_SOURCE, MAIN_SOURCE, "Add benchmark");
        git_helpers::create_branch(&repo, "testing");
        git_helpers::commit_file(
            &repo,
            BENCH_SOURCE,
            "package testing\n\n// BenchmarkSleep sleeps longer.\n",
            "Slower benchmark",
        );
        git_helpers::checkout(&repo, "main");

        let fixture = Self {
            _temp: temp,
            repo,
            bin_dir,
        };
        fixture.write_fake_go();
        fixture.write_fake_benchcmp();
        fixture
    }

    pub fn go_exe(&self) -> PathBuf {
        self.bin_dir.join("go")
    }

    pub fn benchcmp_exe(&self) -> PathBuf {
        self.bin_dir.join("benchcmp")
    }

    /// Scratch path next to the repo, outside the working tree.
    pub fn scratch(&self, name: &str) -> PathBuf {
        self.bin_dir
            .parent()
            .map(|p| p.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }

    /// Lines logged by the fake `go`, empty if it never ran.
    pub fn go_log(&self) -> Vec<String> {
        fs::read_to_string(self.bin_dir.join("go.log"))
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Only the `go test` invocations.
    pub fn bench_runs(&self) -> Vec<String> {
        self.go_log()
            .into_iter()
            .filter(|line| line.contains(" args=test "))
            .collect()
    }

    /// Only the `go tool pprof` invocations.
    pub fn pprof_runs(&self) -> Vec<String> {
        self.go_log()
            .into_iter()
            .filter(|line| line.contains(" args=tool pprof"))
            .collect()
    }

    /// `gobench` preconfigured to run in the fixture repo with the fake tools.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("gobench").unwrap();
        cmd.current_dir(&self.repo)
            .env("GOEXE", self.go_exe())
            .env("GOBENCH_BENCHCMP", self.benchcmp_exe())
            .env("NO_COLOR", "1")
            .env_remove("GOBENCH_CALLGRIND_VIEWER")
            .env_remove("RUST_LOG");
        cmd
    }

    fn write_fake_go(&self) {
        let script = format!(
            r#"#!/bin/sh
log="{log}"
branch=$(git rev-parse --abbrev-ref HEAD)
if git diff-index --quiet HEAD; then tree=clean; else tree=dirty; fi
printf 'branch=%s tree=%s args=%s\n' "$branch" "$tree" "$*" >> "$log"

case "$1" in
version)
    echo "go version go1.22.0 linux/amd64"
    ;;
tool)
    echo "Showing nodes accounting for 10ms"
    ;;
test)
    prev=""
    for arg in "$@"; do
        case "$prev" in
        -cpuprofile|-memprofile|-blockprofile) printf 'profile' > "$arg" ;;
        esac
        prev="$arg"
    done
    echo "goos: linux"
    echo "BenchmarkSleep-8   	       1	   1000000 ns/op	      16 B/op	       1 allocs/op"
    if [ -n "$FAKE_GO_FAIL_BRANCH" ] && [ "$FAKE_GO_FAIL_BRANCH" = "$branch" ]; then
        echo "--- FAIL: BenchmarkSleep" >&2
        echo "FAIL"
        exit 1
    fi
    echo "PASS"
    echo "ok  	./testing	0.011s"
    ;;
*)
    echo "unexpected go invocation: $*" >&2
    exit 2
    ;;
esac
"#,
            log = self.bin_dir.join("go.log").display()
        );
        write_executable(&self.go_exe(), &script);
    }

    fn write_fake_benchcmp(&self) {
        let script = r#"#!/bin/sh
# benchcmp -best old new
[ -f "$2" ] && [ -f "$3" ] || { echo "missing result file" >&2; exit 1; }
echo "benchmark            old ns/op     new ns/op     delta"
echo "BenchmarkSleep-8     1000000       1000000       +0.00%"
echo ""
echo "benchmark            old bytes     new bytes     delta"
echo "BenchmarkSleep-8     16            16            +0.00%"
"#;
        write_executable(&self.benchcmp_exe(), script);
    }
}

#[cfg(unix)]
fn write_executable(path: &Path, content: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, content).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

#[cfg(not(unix))]
fn write_executable(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
}
