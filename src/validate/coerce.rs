use arrow::{
    array::{Array, ArrayRef},
    compute::{can_cast_types, cast_with_options, CastOptions},
    datatypes::DataType,
    error::ArrowError,
};
use thiserror::Error;

use crate::schema::{map_to_arrow_type, TargetType};

#[derive(Debug, Error)]
pub enum CoerceError {
    /// A value in the column has no representation in the target type.
    #[error(transparent)]
    Value(ArrowError),
    #[error("casting {from} to {to} is not supported")]
    Unsupported { from: DataType, to: DataType },
    #[error(transparent)]
    Other(ArrowError),
}

fn classify(err: ArrowError) -> CoerceError {
    match err {
        ArrowError::CastError(_)
        | ArrowError::ParseError(_)
        | ArrowError::ComputeError(_)
        | ArrowError::InvalidArgumentError(_)
        | ArrowError::ArithmeticOverflow(_)
        | ArrowError::DivideByZero => CoerceError::Value(err),
        other => CoerceError::Other(other),
    }
}

/// Cast that fails on the first value it cannot convert instead of
/// turning it into a null.
fn cast_strict(arr: &dyn Array, to: &DataType) -> Result<ArrayRef, CoerceError> {
    if !can_cast_types(arr.data_type(), to) {
        return Err(CoerceError::Unsupported {
            from: arr.data_type().clone(),
            to: to.clone(),
        });
    }
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    cast_with_options(arr, to, &options).map_err(classify)
}

/// Convert a column to the Arrow type of `target`.
///
/// Numbers become timestamps as nanoseconds since the epoch; strings become
/// timestamps by parsing ISO-8601 style text.
pub fn coerce_array(arr: &ArrayRef, target: TargetType) -> Result<ArrayRef, CoerceError> {
    let to = map_to_arrow_type(target);
    match (arr.data_type(), target) {
        (from, TargetType::Timestamp) if from.is_numeric() && *from != DataType::Int64 => {
            let ints = cast_strict(arr.as_ref(), &DataType::Int64)?;
            cast_strict(ints.as_ref(), &to)
        }
        _ => cast_strict(arr.as_ref(), &to),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{
        BinaryArray, Float64Array, Int32Array, Int64Array, StringArray, TimestampMicrosecondArray,
        TimestampNanosecondArray,
    };
    use chrono::NaiveDate;
    use std::sync::Arc;

    #[test]
    fn widens_integers_and_parses_numeric_strings() {
        let ints: ArrayRef = Arc::new(Int32Array::from(vec![1, 2]));
        let out = coerce_array(&ints, TargetType::Integer).unwrap();
        assert_eq!(out.data_type(), &DataType::Int64);

        let text: ArrayRef = Arc::new(StringArray::from(vec!["1.25", "3"]));
        let out = coerce_array(&text, TargetType::Float).unwrap();
        let f = out.as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(f.values().to_vec(), vec![1.25, 3.0]);
    }

    #[test]
    fn non_numeric_string_is_a_value_error() {
        let text: ArrayRef = Arc::new(StringArray::from(vec!["1.0", "N/A"]));
        let err = coerce_array(&text, TargetType::Float).unwrap_err();
        assert!(matches!(err, CoerceError::Value(_)), "got {:?}", err);
        assert!(err.to_string().contains("N/A"));
    }

    #[test]
    fn float_zeros_become_epoch_timestamps() {
        let zeros: ArrayRef = Arc::new(Float64Array::from(vec![0.0, 0.0]));
        let out = coerce_array(&zeros, TargetType::Timestamp).unwrap();
        let ts = out
            .as_any()
            .downcast_ref::<TimestampNanosecondArray>()
            .unwrap();
        assert_eq!(ts.values().to_vec(), vec![0, 0]);
    }

    #[test]
    fn rescales_and_parses_timestamps() {
        let micros: ArrayRef = Arc::new(TimestampMicrosecondArray::from(vec![1_000_000]));
        let out = coerce_array(&micros, TargetType::Timestamp).unwrap();
        let ts = out
            .as_any()
            .downcast_ref::<TimestampNanosecondArray>()
            .unwrap();
        assert_eq!(ts.value(0), 1_000_000_000);

        let text: ArrayRef = Arc::new(StringArray::from(vec!["2023-01-01 00:15:00"]));
        let out = coerce_array(&text, TargetType::Timestamp).unwrap();
        let ts = out
            .as_any()
            .downcast_ref::<TimestampNanosecondArray>()
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 15, 0)
            .unwrap()
            .and_utc()
            .timestamp_nanos_opt()
            .unwrap();
        assert_eq!(ts.value(0), expected);
    }

    #[test]
    fn integers_render_as_strings() {
        let ints: ArrayRef = Arc::new(Int64Array::from(vec![7, 42]));
        let out = coerce_array(&ints, TargetType::String).unwrap();
        let s = out.as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(s.value(1), "42");
    }

    #[test]
    fn unsupported_pairs_are_not_value_errors() {
        let bytes: ArrayRef = Arc::new(BinaryArray::from(vec![b"ab".as_ref()]));
        let err = coerce_array(&bytes, TargetType::Timestamp).unwrap_err();
        assert!(matches!(err, CoerceError::Unsupported { .. }), "got {:?}", err);
    }
}
