// src/schema/arrow.rs

use arrow::datatypes::{DataType, TimeUnit};

use super::types::TargetType;

/// Map a target type onto the Arrow type a conformant column carries.
///
/// - Integer   → Int64
/// - Float     → Float64
/// - String    → Utf8
/// - Timestamp → Timestamp(ns, no timezone)
pub fn map_to_arrow_type(ty: TargetType) -> DataType {
    match ty {
        TargetType::Integer => DataType::Int64,
        TargetType::Float => DataType::Float64,
        TargetType::String => DataType::Utf8,
        TargetType::Timestamp => DataType::Timestamp(TimeUnit::Nanosecond, None),
    }
}

/// True when `dt` already is the Arrow type of `ty`.
pub fn matches_target(dt: &DataType, ty: TargetType) -> bool {
    *dt == map_to_arrow_type(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ExpectedSchema;

    #[test]
    fn conformant_schema_uses_target_types() {
        let schema = ExpectedSchema::parse([
            ("VendorID", "int"),
            ("pickup_datetime", "datetime64[ns]"),
            ("fare_amount", "float"),
            ("store_and_fwd_flag", "string"),
        ])
        .unwrap();

        let types: Vec<_> = schema.iter().map(|(_, ty)| map_to_arrow_type(ty)).collect();
        assert_eq!(
            types,
            vec![
                DataType::Int64,
                DataType::Timestamp(TimeUnit::Nanosecond, None),
                DataType::Float64,
                DataType::Utf8,
            ]
        );
    }

    #[test]
    fn narrower_types_do_not_match() {
        assert!(matches_target(&DataType::Int64, TargetType::Integer));
        assert!(!matches_target(&DataType::Int32, TargetType::Integer));
        assert!(!matches_target(&DataType::LargeUtf8, TargetType::String));
        assert!(!matches_target(
            &DataType::Timestamp(TimeUnit::Microsecond, None),
            TargetType::Timestamp
        ));
    }
}
