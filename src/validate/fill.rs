use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, AsArray, BooleanArray, Date32Array, Int64Array, Scalar, StringArray},
    compute::{cast, is_not_null, kernels::zip::zip},
    datatypes::{ArrowPrimitiveType, DataType, Float16Type, Float32Type, Float64Type},
    record_batch::RecordBatch,
};
use std::sync::Arc;

use super::replace_column;

/// One-element array holding the zero-equivalent of `dt`: numeric 0, the
/// empty string, `false`, or the epoch. `None` when the type has none.
fn zero_of(dt: &DataType) -> Result<Option<ArrayRef>> {
    let zero: ArrayRef = match dt {
        DataType::Boolean => Arc::new(BooleanArray::from(vec![false])),
        DataType::Utf8 => Arc::new(StringArray::from(vec![""])),
        DataType::LargeUtf8 | DataType::Utf8View => cast(&StringArray::from(vec![""]), dt)?,
        DataType::Date32 => Arc::new(Date32Array::from(vec![0])),
        DataType::Timestamp(..) | DataType::Date64 | DataType::Duration(_) => {
            cast(&Int64Array::from(vec![0]), dt)?
        }
        dt if dt.is_numeric() => cast(&Int64Array::from(vec![0]), dt)?,
        _ => return Ok(None),
    };
    Ok(Some(zero))
}

/// Zero every NaN slot of a float array; nulls stay null.
fn zero_nan<T>(arr: &ArrayRef, is_nan: impl Fn(T::Native) -> bool) -> ArrayRef
where
    T: ArrowPrimitiveType,
{
    let values = arr.as_primitive::<T>();
    Arc::new(values.unary::<_, T>(|v| if is_nan(v) { T::Native::default() } else { v }))
}

/// Replace the missing values of one array with its zero-equivalent.
///
/// Missing means null, or NaN in a float column. A `Null`-typed array
/// becomes `Int64` zeros. Types without a zero are returned untouched.
pub fn fill_array(arr: &ArrayRef) -> Result<ArrayRef> {
    let arr = match arr.data_type() {
        DataType::Null => return Ok(Arc::new(Int64Array::from(vec![0i64; arr.len()]))),
        DataType::Float16 => zero_nan::<Float16Type>(arr, |v| v.is_nan()),
        DataType::Float32 => zero_nan::<Float32Type>(arr, |v| v.is_nan()),
        DataType::Float64 => zero_nan::<Float64Type>(arr, |v| v.is_nan()),
        _ => arr.clone(),
    };
    if arr.null_count() == 0 {
        return Ok(arr);
    }
    match zero_of(arr.data_type())? {
        Some(zero) => {
            let mask = is_not_null(arr.as_ref())?;
            Ok(zip(&mask, &arr, &Scalar::new(zero))?)
        }
        None => Ok(arr),
    }
}

/// Fill the nulls of every column in the batch.
pub fn fill_table(batch: &RecordBatch) -> Result<RecordBatch> {
    let mut out = batch.clone();
    for (i, field) in batch.schema().fields().iter().enumerate() {
        let filled = fill_array(batch.column(i))
            .with_context(|| format!("filling nulls in column '{}'", field.name()))?;
        out = replace_column(&out, i, filled)?;
    }
    Ok(out)
}

/// Fill the nulls of a single column.
pub fn fill_column(batch: &RecordBatch, idx: usize) -> Result<RecordBatch> {
    let name = batch.schema().field(idx).name().clone();
    let filled = fill_array(batch.column(idx))
        .with_context(|| format!("filling nulls in column '{}'", name))?;
    replace_column(batch, idx, filled)
}
