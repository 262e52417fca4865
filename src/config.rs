//! YAML batch configuration: a list of data-pull jobs the CLI runs
//! sequentially. Each job is an independent fetch; one failing job
//! aborts the batch, but an incomplete job definition is skipped with
//! a warning instead.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level config file: a `jobs:` list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchConfig {
    #[serde(default)]
    pub jobs: Vec<Job>,
}

/// One data pull. `indicators` and `out` are required for a job to
/// run; jobs missing either are skipped, not fatal.
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub indicators: Vec<String>,
    #[serde(default = "default_countries")]
    pub countries: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub out: Option<PathBuf>,
    /// Long (tidy) rows instead of the default wide layout.
    #[serde(default)]
    pub long: bool,
}

fn default_countries() -> String {
    "all".into()
}

impl BatchConfig {
    /// Load and parse a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<BatchConfig> {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("read {}", path.as_ref().display()))?;
        let cfg: BatchConfig = serde_yaml::from_str(&text).context("parse batch config")?;
        Ok(cfg)
    }
}

impl Job {
    /// Label used in logs.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    /// Whether the job carries everything needed to run.
    pub fn is_runnable(&self) -> bool {
        !self.indicators.is_empty() && self.out.is_some()
    }
}
