//! Optional settings file
//!
//! A `.gobench.yaml` next to the package (or a file passed with `--config`)
//! supplies project defaults. Command-line flags and environment variables
//! take precedence over anything set here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_SETTINGS_FILE: &str = ".gobench.yaml";

/// Errors that can occur when loading the settings file
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Project-level defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub bench: Option<String>,
    pub count: Option<u32>,
    pub tags: Option<String>,
    pub cpu: Option<String>,
    pub go_exe: Option<String>,
    pub benchcmp: Option<String>,
    pub callgrind_viewer: Option<String>,
    pub out_dir: Option<PathBuf>,
}

impl Settings {
    /// Parse settings from a YAML string
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to unit, not to an empty map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Load settings from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the explicit settings file, or the default one in `dir` if it exists.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, SettingsError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let default_path = dir.join(DEFAULT_SETTINGS_FILE);
        if default_path.is_file() {
            tracing::debug!(path = %default_path.display(), "loading settings file");
            Self::load(default_path)
        } else {
            Ok(Self::default())
        }
    }
}
