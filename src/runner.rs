//! Benchmark workflow
//!
//! [`Plan`] decides, from the configuration and the repository state, which
//! runs happen and how the baseline is reached. [`Runner`] carries a plan out
//! against the version-control, benchmark, comparison and profile
//! collaborators, strictly one external process at a time.
//!
//! The baseline always runs before the current revision so that a profile
//! diff subtracts the baseline from the current run.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use crate::cli::output::Output;
use crate::core::config::{ConfigError, RunConfig};
use crate::core::output_dir::OutputDir;
use crate::core::revision::{Revision, RunLabel};
use crate::error::BenchError;
use crate::git::VersionControl;
use crate::tools::profile::profile_exists;
use crate::tools::{BenchmarkEngine, Comparator, ProfileRequest, ProfileViewer};

/// How the working tree is brought to the baseline state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaselineStep {
    /// Shelve the uncommitted changes, run, restore them
    Stash,
    /// Check out `revision` (if any) before the run; `restore` says whether
    /// the original revision has to be checked out again afterwards
    Checkout {
        revision: Option<String>,
        restore: bool,
    },
}

/// The run compared against the current revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineRun {
    pub label: RunLabel,
    pub go_exe: String,
    pub step: BaselineStep,
}

/// What a workflow invocation will do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Revision checked out when the tool started
    pub current_revision: String,
    pub current: RunLabel,
    pub baseline: Option<BaselineRun>,
    /// Resolved `-count`
    pub count: u32,
}

impl Plan {
    /// Query the repository state and resolve the plan for it. Has no side
    /// effects, so configuration conflicts surface before anything is created.
    pub fn query(config: &RunConfig, vcs: &dyn VersionControl) -> Result<Self, BenchError> {
        let current = vcs.current_revision().map_err(BenchError::RevisionQuery)?;
        let dirty = vcs
            .has_uncommitted_changes()
            .map_err(BenchError::RevisionQuery)?;
        Ok(Self::resolve(config, &current, dirty)?)
    }

    /// Decide the sequence of runs for the given repository state.
    ///
    /// Fails when an explicit base is combined with uncommitted changes,
    /// since it is then unclear which "before" state is meant.
    pub fn resolve(
        config: &RunConfig,
        current_revision: &str,
        dirty: bool,
    ) -> Result<Self, ConfigError> {
        if dirty {
            if let Some(base) = &config.base {
                return Err(ConfigError::BaseWithUncommittedChanges(base.clone()));
            }
        }

        let current = RunLabel::new(Revision::named(current_revision));
        let baseline_go_exe = config.baseline_go_exe().to_string();

        let baseline = if dirty {
            Some(BaselineRun {
                label: RunLabel::new(Revision::Stash),
                go_exe: baseline_go_exe,
                step: BaselineStep::Stash,
            })
        } else if config.base.is_some() || config.base_go_exe.is_some() {
            let revision = config.base.clone();
            let name = revision.as_deref().unwrap_or(current_revision);

            // Same revision on both sides: keep the two result files apart
            let label = if name == current_revision {
                let variant = match &config.base_go_exe {
                    Some(exe) => toolchain_name(exe),
                    None => "baseline".to_string(),
                };
                RunLabel::with_variant(Revision::named(name), variant)
            } else {
                RunLabel::new(Revision::named(name))
            };

            let restore = revision
                .as_deref()
                .is_some_and(|base| base != current_revision);

            Some(BaselineRun {
                label,
                go_exe: baseline_go_exe,
                step: BaselineStep::Checkout { revision, restore },
            })
        } else {
            None
        };

        let count = config.resolve_count(baseline.is_some());
        debug!(?baseline, count, "resolved plan");

        Ok(Self {
            current_revision: current_revision.to_string(),
            current,
            baseline,
            count,
        })
    }
}

fn toolchain_name(exe: &str) -> String {
    Path::new(exe)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| exe.to_string())
}

/// One completed benchmark run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub label: RunLabel,
    pub go_exe: String,
    pub results: PathBuf,
    pub profile: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

/// Outcome of a successful workflow
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub plan: Plan,
    /// In execution order: baseline first
    pub runs: Vec<RunRecord>,
    /// Comparison tool output, if a comparison ran
    pub comparison: Option<String>,
}

/// Executes the benchmark workflow
pub struct Runner<'a> {
    config: &'a RunConfig,
    out_dir: &'a OutputDir,
    vcs: &'a dyn VersionControl,
    engine: &'a dyn BenchmarkEngine,
    comparator: &'a dyn Comparator,
    viewer: &'a dyn ProfileViewer,
}

impl<'a> Runner<'a> {
    pub fn new(
        config: &'a RunConfig,
        out_dir: &'a OutputDir,
        vcs: &'a dyn VersionControl,
        engine: &'a dyn BenchmarkEngine,
        comparator: &'a dyn Comparator,
        viewer: &'a dyn ProfileViewer,
    ) -> Self {
        Self {
            config,
            out_dir,
            vcs,
            engine,
            comparator,
            viewer,
        }
    }

    /// Run, compare and profile as planned.
    pub async fn run(&self, plan: Plan) -> Result<RunSummary, BenchError> {
        announce(&plan);

        let mut runs = Vec::with_capacity(2);
        if let Some(baseline) = &plan.baseline {
            runs.push(self.run_baseline(&plan, baseline).await?);
        }
        runs.push(
            self.run_benchmark(&plan.current, &self.config.go_exe, plan.count)
                .await?,
        );

        let comparison = match &plan.baseline {
            Some(baseline) => Some(self.compare(&baseline.label, &plan.current).await?),
            None => None,
        };

        let base_label = plan.baseline.as_ref().map(|b| &b.label);
        if let Some(request) =
            ProfileRequest::new(self.config, self.out_dir, base_label, &plan.current)
        {
            self.show_profile(&request).await?;
        }

        Ok(RunSummary {
            plan,
            runs,
            comparison,
        })
    }

    async fn run_baseline(
        &self,
        plan: &Plan,
        baseline: &BaselineRun,
    ) -> Result<RunRecord, BenchError> {
        match &baseline.step {
            BaselineStep::Stash => {
                Output::info("Stash changes");
                let out = self
                    .vcs
                    .stash_save()
                    .map_err(|e| BenchError::mutation("stash changes", e))?;
                echo(&out);

                let result = self
                    .run_benchmark(&baseline.label, &baseline.go_exe, plan.count)
                    .await;

                match self.vcs.stash_pop() {
                    Ok(out) => {
                        echo(&out);
                        result
                    }
                    Err(e) => {
                        let err = BenchError::mutation("restore stashed changes", e);
                        if let Err(run_err) = result {
                            error!(error = %err, "changes are still stashed");
                            Output::error(&format!(
                                "{}; run 'git stash pop' to restore your changes",
                                err
                            ));
                            return Err(run_err);
                        }
                        Err(err)
                    }
                }
            }
            BaselineStep::Checkout { revision, restore } => {
                if let Some(revision) = revision {
                    let out = self
                        .vcs
                        .checkout(revision)
                        .map_err(|e| BenchError::mutation(format!("checkout '{}'", revision), e))?;
                    echo(&out);
                }

                let result = self
                    .run_benchmark(&baseline.label, &baseline.go_exe, plan.count)
                    .await;

                if *restore {
                    match self.vcs.checkout(&plan.current_revision) {
                        Ok(out) => echo(&out),
                        Err(e) => {
                            let err = BenchError::mutation(
                                format!("checkout '{}'", plan.current_revision),
                                e,
                            );
                            if result.is_ok() {
                                return Err(err);
                            }
                            error!(error = %err, "working tree left on the baseline revision");
                            Output::error(&format!(
                                "{}; run 'git checkout {}' to return",
                                err, plan.current_revision
                            ));
                        }
                    }
                }
                result
            }
        }
    }

    async fn run_benchmark(
        &self,
        label: &RunLabel,
        go_exe: &str,
        count: u32,
    ) -> Result<RunRecord, BenchError> {
        Output::info(&format!(
            "Running benchmarks on {}",
            Output::revision(&label.to_string())
        ));
        match self.engine.version(go_exe).await {
            Ok(banner) => Output::subheader(&banner),
            Err(e) => warn!(go_exe, error = %e, "could not determine toolchain version"),
        }

        let results = self.out_dir.bench_file(label);
        let profile = self
            .config
            .profiling_enabled()
            .then(|| self.out_dir.profile_file(label));
        let args = self.config.bench_args(count, profile.as_deref());

        let started_at = Utc::now();
        let start = Instant::now();
        self.engine
            .run(go_exe, &args, &results)
            .await
            .map_err(|e| BenchError::benchmark(label, e))?;
        let duration = start.elapsed();
        debug!(%label, ?duration, "benchmark run complete");

        Ok(RunRecord {
            label: label.clone(),
            go_exe: go_exe.to_string(),
            results,
            profile,
            started_at,
            duration,
        })
    }

    async fn compare(&self, base: &RunLabel, current: &RunLabel) -> Result<String, BenchError> {
        let old = self.out_dir.bench_file(base);
        let new = self.out_dir.bench_file(current);

        let spinner = Output::spinner(&format!("Comparing {} and {}", base, current));
        let report = self.comparator.compare(&old, &new).await;
        spinner.finish_and_clear();
        let report = report?;

        // Make it stand out a little
        print!("\n\n");
        println!("{}", report);
        Ok(report)
    }

    async fn show_profile(&self, request: &ProfileRequest) -> Result<(), BenchError> {
        let missing = std::iter::once(&request.profile)
            .chain(request.base_profile.as_ref())
            .find(|path| !profile_exists(path));
        if let Some(path) = missing {
            Output::warning(&format!(
                "No profile written to {}; did any benchmark match '{}'?",
                path.display(),
                self.config.bench
            ));
            return Ok(());
        }
        self.viewer.show(request).await?;
        Ok(())
    }
}

fn announce(plan: &Plan) {
    let current = &plan.current_revision;
    match &plan.baseline {
        None => Output::header(&format!("Benchmark branch {:?}", current)),
        Some(BaselineRun {
            step: BaselineStep::Checkout { revision: None, .. },
            go_exe,
            ..
        }) => Output::header(&format!(
            "Benchmark branch {:?} and compare toolchain {:?} with the default",
            current, go_exe
        )),
        Some(baseline) => Output::header(&format!(
            "Benchmark and compare branch {:?} and {:?}.",
            baseline.label.revision.to_string(),
            current
        )),
    }
}

fn echo(output: &str) {
    if !output.trim().is_empty() {
        println!("{}", output);
    }
}
