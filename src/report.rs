//! JSON summary of a completed run (`--report`)

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::config::{ProfileKind, RunConfig};
use crate::runner::{RunRecord, RunSummary};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub package: String,
    pub bench: String,
    pub count: u32,
    pub baseline: Option<String>,
    pub current: String,
    pub profile: Option<ProfileKind>,
    pub runs: Vec<RunEntry>,
    pub comparison: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunEntry {
    pub label: String,
    pub go_exe: String,
    pub results: PathBuf,
    pub profile: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl From<&RunRecord> for RunEntry {
    fn from(record: &RunRecord) -> Self {
        Self {
            label: record.label.to_string(),
            go_exe: record.go_exe.clone(),
            results: record.results.clone(),
            profile: record.profile.clone(),
            started_at: record.started_at,
            duration_ms: u64::try_from(record.duration.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl RunReport {
    pub fn new(config: &RunConfig, summary: &RunSummary) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            package: config.package.clone(),
            bench: config.bench.clone(),
            count: summary.plan.count,
            baseline: summary
                .plan
                .baseline
                .as_ref()
                .map(|b| b.label.to_string()),
            current: summary.plan.current.to_string(),
            profile: config.profile,
            runs: summary.runs.iter().map(RunEntry::from).collect(),
            comparison: summary.comparison.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report, creating parent directories as needed.
    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
