//! Optional YAML configuration.
//!
//! ```yaml
//! data_path: ../processed/student_performance_clean.csv
//! delimiter: ","
//! encoding: utf-8
//! filters:
//!   gender: Female
//!   min_attendance: 60
//! ```
//!
//! Command-line flags take precedence over the file, and the file over the
//! built-in defaults.

use std::{fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::FilterArgs;

pub const DEFAULT_DATA_PATH: &str = "../processed/student_performance_clean.csv";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub data_path: Option<PathBuf>,
    pub delimiter: Option<String>,
    pub encoding: Option<String>,
    pub filters: FilterDefaults,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterDefaults {
    pub gender: Option<String>,
    pub learning_style: Option<String>,
    pub min_attendance: Option<f64>,
    pub max_attendance: Option<f64>,
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Opening configuration file {path:?}"))?;
        Self::parse(&raw).with_context(|| format!("Parsing configuration file {path:?}"))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Data file location; a relative `data_path` is resolved against the
    /// directory holding the configuration file.
    pub fn data_path(&self, config_path: Option<&Path>) -> Option<PathBuf> {
        let path = self.data_path.as_ref()?;
        match config_path.and_then(Path::parent) {
            Some(dir) if path.is_relative() && !dir.as_os_str().is_empty() => Some(dir.join(path)),
            _ => Some(path.clone()),
        }
    }
}

impl FilterDefaults {
    /// Overlays command-line filter flags on the configured defaults.
    pub fn merge(&self, args: &FilterArgs) -> FilterArgs {
        FilterArgs {
            gender: args.gender.clone().or_else(|| self.gender.clone()),
            learning_style: args
                .learning_style
                .clone()
                .or_else(|| self.learning_style.clone()),
            min_attendance: args.min_attendance.or(self.min_attendance),
            max_attendance: args.max_attendance.or(self.max_attendance),
        }
    }
}
