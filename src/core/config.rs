//! Run configuration
//!
//! Merges command-line flags, environment and the settings file into a
//! validated [`RunConfig`]. Nothing here touches the repository or the
//! filesystem beyond reading the settings file.

use clap::ValueEnum;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings::{Settings, SettingsError};
use crate::cli::args::BenchArgs;

/// Benchmark filter used when none is configured.
pub const DEFAULT_BENCH: &str = "Bench*";
/// Go toolchain binary used when neither `--go-exe` nor `GOEXE` is set.
pub const DEFAULT_GO_EXE: &str = "go";
pub const DEFAULT_BENCHCMP: &str = "benchcmp";
pub const DEFAULT_CALLGRIND_VIEWER: &str = "qcachegrind";
/// Repeat count when two runs are compared; benchcmp keeps the best of them.
pub const COMPARE_COUNT: u32 = 3;
/// Passed to `go test -timeout`. Comparison runs with a high count are slow.
pub const BENCH_TIMEOUT: &str = "30m";

/// Errors detected while resolving the configuration, before any side effect
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required option --package")]
    MissingPackage,

    #[error("benchmark pattern must not be empty")]
    EmptyBenchPattern,

    #[error("mutually exclusive profiling modes: {0}")]
    ConflictingProfiles(String),

    #[error("{0} requires a profiling mode (--prof-type)")]
    ProfilingRequired(&'static str),

    #[error("invalid --cpu list '{0}': expected comma-separated positive integers")]
    InvalidCpuList(String),

    #[error(
        "cannot compare against '{0}' with uncommitted changes; commit or stash them first, \
         or omit --base to compare against the stashed changes"
    )]
    BaseWithUncommittedChanges(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Kind of profile written by `go test`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Cpu,
    #[value(name = "mem")]
    #[serde(rename = "mem")]
    Memory,
    Block,
}

impl ProfileKind {
    /// The `go test` flag that writes this profile
    pub fn test_flag(self) -> &'static str {
        match self {
            ProfileKind::Cpu => "-cpuprofile",
            ProfileKind::Memory => "-memprofile",
            ProfileKind::Block => "-blockprofile",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProfileKind::Cpu => "cpu",
            ProfileKind::Memory => "mem",
            ProfileKind::Block => "block",
        }
    }
}

/// Fully resolved configuration for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Benchmark name filter (`go test -bench`)
    pub bench: String,
    /// Explicit repeat count; `None` defers to [`RunConfig::resolve_count`]
    pub count: Option<u32>,
    pub package: String,
    /// Revision to compare with
    pub base: Option<String>,
    /// Toolchain for the current run (and the baseline, unless overridden)
    pub go_exe: String,
    /// Toolchain for the baseline run
    pub base_go_exe: Option<String>,
    pub tags: Option<String>,
    pub cpu: Vec<u32>,
    pub profile: Option<ProfileKind>,
    pub prof_callgrind: bool,
    pub prof_sample_index: Option<String>,
    /// User-supplied output directory; a temp dir is used when unset
    pub out_dir: Option<PathBuf>,
    pub benchcmp: String,
    pub callgrind_viewer: String,
    pub report: Option<PathBuf>,
}

impl RunConfig {
    /// Resolve flags against the settings file and built-in defaults.
    pub fn resolve(args: &BenchArgs, settings: &Settings) -> Result<Self, ConfigError> {
        let profile = resolve_profile(args)?;

        if profile.is_none() {
            if args.prof_callgrind {
                return Err(ConfigError::ProfilingRequired("--prof-callgrind"));
            }
            if args.prof_sample_index.is_some() {
                return Err(ConfigError::ProfilingRequired("--prof-sample-index"));
            }
        }

        let package = non_empty(args.package.clone()).ok_or(ConfigError::MissingPackage)?;

        let bench = args
            .bench
            .clone()
            .or_else(|| settings.bench.clone())
            .unwrap_or_else(|| DEFAULT_BENCH.to_string());
        if bench.trim().is_empty() {
            return Err(ConfigError::EmptyBenchPattern);
        }

        let cpu = match args.cpu.as_deref().or(settings.cpu.as_deref()) {
            Some(list) => parse_cpu_list(list)?,
            None => Vec::new(),
        };

        Ok(Self {
            bench,
            count: args.count.or(settings.count).filter(|&n| n > 0),
            package,
            base: non_empty(args.base.clone()),
            go_exe: non_empty(args.go_exe.clone())
                .or_else(|| settings.go_exe.clone())
                .unwrap_or_else(|| DEFAULT_GO_EXE.to_string()),
            base_go_exe: non_empty(args.base_go_exe.clone()),
            tags: non_empty(args.tags.clone()).or_else(|| non_empty(settings.tags.clone())),
            cpu,
            profile,
            prof_callgrind: args.prof_callgrind,
            prof_sample_index: non_empty(args.prof_sample_index.clone()),
            out_dir: args.out_dir.clone().or_else(|| settings.out_dir.clone()),
            benchcmp: non_empty(args.benchcmp.clone())
                .or_else(|| settings.benchcmp.clone())
                .unwrap_or_else(|| DEFAULT_BENCHCMP.to_string()),
            callgrind_viewer: non_empty(args.callgrind_viewer.clone())
                .or_else(|| settings.callgrind_viewer.clone())
                .unwrap_or_else(|| DEFAULT_CALLGRIND_VIEWER.to_string()),
            report: args.report.clone(),
        })
    }

    /// Repeat count for this run: the explicit count if one was given,
    /// otherwise 1 for a single run and [`COMPARE_COUNT`] for a comparison.
    pub fn resolve_count(&self, comparing: bool) -> u32 {
        match self.count {
            Some(n) => n,
            None if comparing => COMPARE_COUNT,
            None => 1,
        }
    }

    pub fn profiling_enabled(&self) -> bool {
        self.profile.is_some()
    }

    /// Toolchain used for the baseline run
    pub fn baseline_go_exe(&self) -> &str {
        self.base_go_exe.as_deref().unwrap_or(&self.go_exe)
    }

    /// Arguments for `go test`, with the package last.
    pub fn bench_args(&self, count: u32, profile_path: Option<&Path>) -> Vec<String> {
        let mut args = vec![
            "test".to_string(),
            "-run".to_string(),
            "NONE".to_string(),
            "-bench".to_string(),
            self.bench.clone(),
            format!("-count={}", count),
            "-test.benchmem=true".to_string(),
            format!("-timeout={}", BENCH_TIMEOUT),
        ];

        if let Some(tags) = &self.tags {
            args.push("-tags".to_string());
            args.push(tags.clone());
        }

        if !self.cpu.is_empty() {
            let list: Vec<String> = self.cpu.iter().map(|n| n.to_string()).collect();
            args.push(format!("-cpu={}", list.join(",")));
        }

        if let (Some(kind), Some(path)) = (self.profile, profile_path) {
            args.push(kind.test_flag().to_string());
            args.push(path.display().to_string());
        }

        args.push(self.package.clone());
        args
    }
}

fn resolve_profile(args: &BenchArgs) -> Result<Option<ProfileKind>, ConfigError> {
    let mut requested: Vec<ProfileKind> = Vec::new();
    let switches = [
        (args.prof_cpu, ProfileKind::Cpu),
        (args.prof_mem, ProfileKind::Memory),
        (args.prof_block, ProfileKind::Block),
    ];
    for kind in args.prof_type.into_iter().chain(
        switches
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, kind)| *kind),
    ) {
        if !requested.contains(&kind) {
            requested.push(kind);
        }
    }

    match requested.as_slice() {
        [] => Ok(None),
        [kind] => Ok(Some(*kind)),
        kinds => {
            let names: Vec<&str> = kinds.iter().map(|k| k.name()).collect();
            Err(ConfigError::ConflictingProfiles(names.join(" and ")))
        }
    }
}

fn parse_cpu_list(list: &str) -> Result<Vec<u32>, ConfigError> {
    list.split(',')
        .map(|entry| match entry.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::InvalidCpuList(list.to_string())),
        })
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
