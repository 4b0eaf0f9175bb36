// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::process::{Handoff, ParquetOutput, Preview};
use crate::schema::Category;
use crate::validate::NullFill;

/// Environment variable naming a config file when none is passed on the
/// command line.
pub const CONFIG_ENV: &str = "TRIPCHECK_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySource {
    pub category: Category,
    pub directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum OutputConfig {
    /// Print the first `rows` rows of each validated file.
    Preview {
        #[serde(default = "default_preview_rows")]
        rows: usize,
    },
    /// Write validated files under `dir/<category>/`.
    Parquet { dir: PathBuf },
}

fn default_preview_rows() -> usize {
    5
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig::Preview {
            rows: default_preview_rows(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub categories: Vec<CategorySource>,
    pub file_extension: String,
    pub output: OutputConfig,
    pub null_fill: NullFill,
    pub parallel: bool,
    /// ERROR-level log file; `None` disables it.
    pub log_file: Option<PathBuf>,
    pub summary_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            categories: Category::ALL
                .iter()
                .map(|&category| CategorySource {
                    category,
                    directory: category.default_directory(),
                })
                .collect(),
            file_extension: ".parquet".into(),
            output: OutputConfig::default(),
            null_fill: NullFill::default(),
            parallel: false,
            log_file: Some(PathBuf::from("data_validation.log")),
            summary_file: None,
        }
    }
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing config YAML")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        Self::from_yaml(&text).with_context(|| format!("loading config {:?}", path))
    }

    /// Load from `arg`, else from `$TRIPCHECK_CONFIG`, else use the defaults.
    pub fn resolve(arg: Option<String>) -> Result<Self> {
        match arg.or_else(|| env::var(CONFIG_ENV).ok()) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn handoff(&self) -> Box<dyn Handoff> {
        match &self.output {
            OutputConfig::Preview { rows } => Box::new(Preview::new(*rows)),
            OutputConfig::Parquet { dir } => Box::new(ParquetOutput::new(dir)),
        }
    }
}
