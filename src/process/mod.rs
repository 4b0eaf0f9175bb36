// src/process/mod.rs
pub mod handoff;
pub mod read;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, info_span};

use crate::config::Config;
use crate::schema::{Category, ExpectedSchema};
use crate::validate::{Anomaly, Validator};
pub use handoff::{Handoff, ParquetOutput, Preview};
pub use read::{discover_files, read_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Validated { anomalies: usize },
    Failed,
}

/// Per-category counts for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub directory: PathBuf,
    pub files_seen: usize,
    pub validated: usize,
    pub failed: usize,
    pub anomalies: usize,
    /// Set when the directory itself could not be listed.
    pub skipped: Option<String>,
}

impl CategorySummary {
    fn new(category: Category, directory: &Path) -> Self {
        Self {
            category,
            directory: directory.to_path_buf(),
            files_seen: 0,
            validated: 0,
            failed: 0,
            anomalies: 0,
            skipped: None,
        }
    }

    fn record(&mut self, outcome: FileOutcome) {
        self.files_seen += 1;
        match outcome {
            FileOutcome::Validated { anomalies } => {
                self.validated += 1;
                self.anomalies += anomalies;
            }
            FileOutcome::Failed => self.failed += 1,
        }
    }
}

/// One recorded anomaly and the file it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileAnomaly {
    pub file: String,
    #[serde(flatten)]
    pub anomaly: Anomaly,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub categories: Vec<CategorySummary>,
    /// Filled in by callers that collect anomalies; empty from `Pipeline::run`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub anomaly_log: Vec<FileAnomaly>,
}

impl RunSummary {
    pub fn files_failed(&self) -> usize {
        self.categories.iter().map(|c| c.failed).sum()
    }

    pub fn anomalies(&self) -> usize {
        self.categories.iter().map(|c| c.anomalies).sum()
    }
}

/// One loop over category → (directory, schema), sharing a validator and a
/// handoff across every file.
pub struct Pipeline {
    config: Config,
    validator: Validator,
    handoff: Box<dyn Handoff>,
}

impl Pipeline {
    pub fn new(config: Config, validator: Validator, handoff: Box<dyn Handoff>) -> Self {
        Self {
            config,
            validator,
            handoff,
        }
    }

    pub fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let mut categories = Vec::with_capacity(self.config.categories.len());

        for source in &self.config.categories {
            let category = source.category;
            let schema = category.schema()?;
            let mut summary = CategorySummary::new(category, &source.directory);

            let files = match discover_files(&source.directory, &self.config.file_extension) {
                Ok(files) => files,
                Err(e) => {
                    error!(%category, "skipping category: {:#}", e);
                    summary.skipped = Some(format!("{:#}", e));
                    categories.push(summary);
                    continue;
                }
            };
            info!(
                %category,
                files = files.len(),
                dir = %source.directory.display(),
                "validating"
            );

            let outcomes: Vec<FileOutcome> = if self.config.parallel {
                files
                    .par_iter()
                    .map(|path| self.process_file(category, &schema, path))
                    .collect()
            } else {
                files
                    .iter()
                    .map(|path| self.process_file(category, &schema, path))
                    .collect()
            };
            for outcome in outcomes {
                summary.record(outcome);
            }

            info!(
                %category,
                validated = summary.validated,
                failed = summary.failed,
                anomalies = summary.anomalies,
                "category done"
            );
            categories.push(summary);
        }

        Ok(RunSummary {
            started_at,
            finished_at: Utc::now(),
            categories,
            anomaly_log: Vec::new(),
        })
    }

    /// Read, validate and deliver one file. Failures stay with this file.
    fn process_file(
        &self,
        category: Category,
        schema: &ExpectedSchema,
        path: &Path,
    ) -> FileOutcome {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        // anomaly events name the file themselves
        let span = info_span!("process", %category);
        let _enter = span.enter();

        let result = read_table(path)
            .and_then(|batch| self.validator.validate(&name, &batch, schema))
            .and_then(|validated| {
                if validated.is_clean() {
                    debug!(file = %name, "conformant");
                } else {
                    info!(
                        file = %name,
                        anomalies = validated.anomalies.len(),
                        failed = ?validated.failed_columns(),
                        "validated with anomalies"
                    );
                }
                self.handoff.deliver(category, path, &validated)?;
                Ok(validated.anomalies.len())
            });

        match result {
            Ok(anomalies) => FileOutcome::Validated { anomalies },
            Err(e) => {
                error!("An error occurred while processing file '{}': {:#}", name, e);
                FileOutcome::Failed
            }
        }
    }
}
