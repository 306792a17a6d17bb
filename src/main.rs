//! gobench CLI entry point

use clap::{CommandFactory, Parser};
use clap_complete::generate;

use gobench::cli::{BenchArgs, Output};
use gobench::core::{OutputDir, RunConfig, Settings};
use gobench::git::GitCli;
use gobench::report::RunReport;
use gobench::telemetry::{init_telemetry, TelemetryConfig};
use gobench::tools::{Benchcmp, GoTest, Pprof};
use gobench::{Plan, Runner};

#[tokio::main]
async fn main() {
    let args = BenchArgs::parse();

    if let Some(shell) = args.completions {
        let mut cmd = BenchArgs::command();
        generate(shell, &mut cmd, "gobench", &mut std::io::stdout());
        return;
    }

    let _telemetry = match init_telemetry(&TelemetryConfig::from_flags(args.verbose)) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: failed to initialize logging: {}", e);
            None
        }
    };

    if let Err(e) = run(args).await {
        Output::error(&format!("Error: {}", e));
        std::process::exit(1);
    }
}

async fn run(args: BenchArgs) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::discover(args.config.as_deref(), &cwd)
        .map_err(gobench::core::ConfigError::from)?;
    let config = RunConfig::resolve(&args, &settings)?;

    let vcs = GitCli::discover(&cwd).map_err(gobench::BenchError::RevisionQuery)?;
    let plan = Plan::query(&config, &vcs)?;
    let out_dir = OutputDir::prepare(config.out_dir.as_deref())?;
    tracing::debug!(out_dir = %out_dir.path().display(), "writing results");

    let engine = GoTest;
    let comparator = Benchcmp::new(config.benchcmp.clone());
    let viewer = Pprof::new(config.go_exe.clone(), config.callgrind_viewer.clone());

    let summary = Runner::new(&config, &out_dir, &vcs, &engine, &comparator, &viewer)
        .run(plan)
        .await?;

    if !out_dir.is_temporary() {
        Output::success(&format!("Results written to {}", out_dir.path().display()));
    }

    if let Some(path) = &config.report {
        RunReport::new(&config, &summary).write(path)?;
        Output::success(&format!("Report written to {}", path.display()));
    }

    Ok(())
}
