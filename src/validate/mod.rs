// src/validate/mod.rs
//
// Schema conformance for one in-memory table: normalize names, report missing
// columns, reindex to the expected order, then coerce column by column.

pub mod anomaly;
pub mod coerce;
pub mod fill;
pub mod reindex;
pub mod sink;

use anyhow::{Context, Result};
use arrow::{
    array::ArrayRef,
    datatypes::{Field, FieldRef, Schema},
    record_batch::RecordBatch,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::schema::{matches_target, ExpectedSchema};
pub use anomaly::{Anomaly, AnomalyKind};
use coerce::CoerceError;
pub use sink::{DiagnosticsSink, Fanout, MemorySink, TracingSink};

/// How much of the table gets null-filled before a column is cast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullFill {
    /// Every column, the first time any column needs coercion.
    #[default]
    Table,
    /// Only the column being coerced.
    Column,
}

/// A conformed table plus what was wrong with its input.
#[derive(Debug, Clone)]
pub struct Validated {
    pub batch: RecordBatch,
    pub anomalies: Vec<Anomaly>,
}

impl Validated {
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }

    /// Columns whose coercion was abandoned.
    pub fn failed_columns(&self) -> Vec<&str> {
        self.anomalies.iter().filter_map(Anomaly::column).collect()
    }
}

pub struct Validator {
    sink: Arc<dyn DiagnosticsSink>,
    null_fill: NullFill,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl Validator {
    pub fn new(sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self {
            sink,
            null_fill: NullFill::default(),
        }
    }

    pub fn with_null_fill(mut self, null_fill: NullFill) -> Self {
        self.null_fill = null_fill;
        self
    }

    fn report(&self, source: &str, anomalies: &mut Vec<Anomaly>, anomaly: Anomaly) {
        self.sink.record(source, &anomaly);
        anomalies.push(anomaly);
    }

    /// Conform `batch` to `schema`. `source` names the input in diagnostics.
    ///
    /// Missing columns and failed coercions are reported and returned as
    /// anomalies; only structural problems (colliding column names) are
    /// errors. The input batch is never modified.
    #[instrument(level = "debug", skip_all, fields(rows = batch.num_rows()))]
    pub fn validate(
        &self,
        source: &str,
        batch: &RecordBatch,
        schema: &ExpectedSchema,
    ) -> Result<Validated> {
        let mut anomalies = Vec::new();

        // 1) case-normalize
        let normalized = reindex::normalize_columns(batch)?;

        // 2) missing columns
        let missing = reindex::missing_columns(&normalized, schema);
        if !missing.is_empty() {
            self.report(
                source,
                &mut anomalies,
                Anomaly::MissingColumns { columns: missing },
            );
        }

        // 3) canonical order
        let mut table = reindex::reindex(&normalized, schema)?;

        // 4) coerce column by column
        let mut table_filled = false;
        for (idx, (column, target)) in schema.iter().enumerate() {
            if matches_target(table.column(idx).data_type(), target) {
                continue;
            }

            let prepared = match self.null_fill {
                NullFill::Table if table_filled => Ok(table.clone()),
                NullFill::Table => fill::fill_table(&table),
                NullFill::Column => fill::fill_column(&table, idx),
            };
            table = match prepared {
                Ok(t) => t,
                Err(e) => {
                    self.report(
                        source,
                        &mut anomalies,
                        Anomaly::ColumnProcessing {
                            column: column.to_string(),
                            target,
                            cause: format!("{:#}", e),
                        },
                    );
                    continue;
                }
            };
            if self.null_fill == NullFill::Table {
                table_filled = true;
            }

            let from = table.column(idx).data_type().clone();
            match coerce::coerce_array(table.column(idx), target) {
                Ok(arr) => {
                    table = replace_column(&table, idx, arr)?;
                    debug!(file = source, column, %from, %target, "coerced");
                }
                Err(CoerceError::Value(e)) => self.report(
                    source,
                    &mut anomalies,
                    Anomaly::ValueCoercion {
                        column: column.to_string(),
                        target,
                        cause: e.to_string(),
                    },
                ),
                Err(e) => self.report(
                    source,
                    &mut anomalies,
                    Anomaly::ColumnProcessing {
                        column: column.to_string(),
                        target,
                        cause: e.to_string(),
                    },
                ),
            }
        }

        Ok(Validated {
            batch: table,
            anomalies,
        })
    }
}

/// Validate with the default options, reporting through `tracing`.
pub fn validate_and_coerce(batch: &RecordBatch, schema: &ExpectedSchema) -> Result<Validated> {
    Validator::default().validate("table", batch, schema)
}

/// Swap column `idx` for `array`, taking the field type from the array.
pub(crate) fn replace_column(
    batch: &RecordBatch,
    idx: usize,
    array: ArrayRef,
) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
    let mut columns = batch.columns().to_vec();

    let old = &fields[idx];
    let field = Field::new(old.name(), array.data_type().clone(), old.is_nullable());
    fields[idx] = Arc::new(field);
    columns[idx] = array;

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .with_context(|| format!("replacing column {}", idx))
}
