//! Command-line arguments

use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;

use crate::core::config::ProfileKind;

/// Raw command-line flags. Defaults that depend on the settings file or on
/// repository state are applied later by [`crate::core::config::RunConfig::resolve`].
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "gobench")]
#[command(
    author,
    version,
    about = "Benchmark and compare Go packages across git revisions",
    long_about = None
)]
pub struct BenchArgs {
    /// Run only benchmarks matching a regular expression [default: Bench*]
    #[arg(long)]
    pub bench: Option<String>,

    /// Run each benchmark this many times [default: 1, or 3 when comparing]
    #[arg(long)]
    pub count: Option<u32>,

    /// Package to test (e.g. ./lib)
    #[arg(long)]
    pub package: Option<String>,

    /// Git revision (tag, branch etc.) to compare with. Leave empty to run on
    /// the current branch only
    #[arg(long)]
    pub base: Option<String>,

    /// Go toolchain binary [default: go]
    #[arg(long, env = "GOEXE")]
    pub go_exe: Option<String>,

    /// Go toolchain binary for the baseline run
    #[arg(long)]
    pub base_go_exe: Option<String>,

    /// Build tags passed to go test
    #[arg(long)]
    pub tags: Option<String>,

    /// Comma-separated GOMAXPROCS values to run each benchmark with
    #[arg(long)]
    pub cpu: Option<String>,

    /// Write a profile of this kind and open it in pprof
    #[arg(long, value_enum)]
    pub prof_type: Option<ProfileKind>,

    /// Write a CPU profile and open it in pprof (same as --prof-type cpu)
    #[arg(long)]
    pub prof_cpu: bool,

    /// Write a memory profile and open it in pprof (same as --prof-type mem)
    #[arg(long)]
    pub prof_mem: bool,

    /// Write a block profile and open it in pprof (same as --prof-type block)
    #[arg(long)]
    pub prof_block: bool,

    /// Export the profile in callgrind format and open it in the callgrind viewer
    #[arg(long)]
    pub prof_callgrind: bool,

    /// Sample index passed to pprof (e.g. alloc_space)
    #[arg(long)]
    pub prof_sample_index: Option<String>,

    /// Directory to write files to. Defaults to a temp dir
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Benchmark comparison tool [default: benchcmp]
    #[arg(long, env = "GOBENCH_BENCHCMP")]
    pub benchcmp: Option<String>,

    /// Viewer launched on callgrind output [default: qcachegrind]
    #[arg(long, env = "GOBENCH_CALLGRIND_VIEWER")]
    pub callgrind_viewer: Option<String>,

    /// Settings file [default: .gobench.yaml if present]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write a JSON summary of the run to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Show debug logging (external commands, plan decisions)
    #[arg(short, long)]
    pub verbose: bool,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}
