use anyhow::{bail, Context, Result};
use arrow::{
    array::{new_null_array, ArrayRef},
    datatypes::{DataType, Field, FieldRef, Schema},
    record_batch::RecordBatch,
};
use std::{collections::HashSet, sync::Arc};

use crate::schema::{normalize_name, ExpectedSchema};

/// Rename every column to its trimmed, lowercased form.
///
/// Two columns that normalize to the same name cannot be told apart, so
/// that is an error rather than an anomaly.
pub fn normalize_columns(batch: &RecordBatch) -> Result<RecordBatch> {
    let mut seen = HashSet::new();
    let mut fields: Vec<FieldRef> = Vec::with_capacity(batch.num_columns());
    for field in batch.schema().fields() {
        let name = normalize_name(field.name());
        if !seen.insert(name.clone()) {
            bail!("column '{}' appears more than once after lowercasing", name);
        }
        fields.push(Arc::new(field.as_ref().clone().with_name(name)));
    }
    RecordBatch::try_new(Arc::new(Schema::new(fields)), batch.columns().to_vec())
        .context("renaming columns")
}

/// Schema columns with no counterpart in the batch, in schema order.
pub fn missing_columns(batch: &RecordBatch, schema: &ExpectedSchema) -> Vec<String> {
    let present = batch.schema();
    schema
        .names()
        .filter(|name| present.index_of(name).is_err())
        .map(str::to_string)
        .collect()
}

/// Rebuild the batch with exactly the schema's columns, in schema order.
///
/// Columns the batch lacks are added as all-null `Float64`; columns the
/// schema lacks are dropped. A batch already in schema order is returned
/// as is.
pub fn reindex(batch: &RecordBatch, schema: &ExpectedSchema) -> Result<RecordBatch> {
    let current = batch.schema();
    let in_order = current.fields().len() == schema.len()
        && current
            .fields()
            .iter()
            .zip(schema.names())
            .all(|(f, name)| f.name() == name);
    if in_order {
        return Ok(batch.clone());
    }

    let rows = batch.num_rows();
    let mut fields: Vec<FieldRef> = Vec::with_capacity(schema.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.len());
    for name in schema.names() {
        match current.index_of(name) {
            Ok(i) => {
                fields.push(current.fields()[i].clone());
                columns.push(batch.column(i).clone());
            }
            Err(_) => {
                fields.push(Arc::new(Field::new(name, DataType::Float64, true)));
                columns.push(new_null_array(&DataType::Float64, rows));
            }
        }
    }
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).context("reindexing columns")
}
