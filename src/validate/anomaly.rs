use serde::Serialize;
use std::fmt;

use crate::schema::TargetType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    MissingColumns,
    /// Values in the column could not be converted to the target type.
    ValueCoercion,
    /// Anything else that stopped a column from being converted.
    ColumnProcessing,
}

/// A condition worth an operator's attention. None of them is fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    MissingColumns {
        columns: Vec<String>,
    },
    ValueCoercion {
        column: String,
        target: TargetType,
        cause: String,
    },
    ColumnProcessing {
        column: String,
        target: TargetType,
        cause: String,
    },
}

impl Anomaly {
    pub fn kind(&self) -> AnomalyKind {
        match self {
            Anomaly::MissingColumns { .. } => AnomalyKind::MissingColumns,
            Anomaly::ValueCoercion { .. } => AnomalyKind::ValueCoercion,
            Anomaly::ColumnProcessing { .. } => AnomalyKind::ColumnProcessing,
        }
    }

    /// The column a coercion failure is about; `None` for missing columns.
    pub fn column(&self) -> Option<&str> {
        match self {
            Anomaly::MissingColumns { .. } => None,
            Anomaly::ValueCoercion { column, .. } | Anomaly::ColumnProcessing { column, .. } => {
                Some(column)
            }
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Anomaly::MissingColumns { columns } => columns.join(", "),
            Anomaly::ValueCoercion { cause, .. } | Anomaly::ColumnProcessing { cause, .. } => {
                cause.clone()
            }
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::MissingColumns { columns } => {
                write!(f, "Missing columns: {}", columns.join(", "))
            }
            Anomaly::ValueCoercion { column, cause, .. } => {
                write!(f, "Error occurred while coercing column '{}': {}", column, cause)
            }
            Anomaly::ColumnProcessing { column, cause, .. } => write!(
                f,
                "An error occurred while processing column '{}': {}",
                column, cause
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_log_shapes() {
        let missing = Anomaly::MissingColumns {
            columns: vec!["passenger_count".into(), "airport_fee".into()],
        };
        assert_eq!(
            missing.to_string(),
            "Missing columns: passenger_count, airport_fee"
        );
        assert_eq!(missing.kind(), AnomalyKind::MissingColumns);
        assert_eq!(missing.column(), None);

        let value = Anomaly::ValueCoercion {
            column: "trip_distance".into(),
            target: TargetType::Float,
            cause: "bad value".into(),
        };
        assert_eq!(
            value.to_string(),
            "Error occurred while coercing column 'trip_distance': bad value"
        );
        assert_eq!(value.column(), Some("trip_distance"));

        let other = Anomaly::ColumnProcessing {
            column: "tips".into(),
            target: TargetType::Float,
            cause: "unsupported".into(),
        };
        assert_eq!(
            other.to_string(),
            "An error occurred while processing column 'tips': unsupported"
        );
        assert_eq!(other.detail(), "unsupported");
    }
}
