// src/schema/types.rs

use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, str::FromStr};
use thiserror::Error;

/// The closed set of types a column can be coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Integer,
    Float,
    String,
    Timestamp,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Integer => "int",
            TargetType::Float => "float",
            TargetType::String => "string",
            TargetType::Timestamp => "datetime64[ns]",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" | "int64" => Ok(TargetType::Integer),
            "float" | "float64" | "double" => Ok(TargetType::Float),
            "string" | "str" | "utf8" => Ok(TargetType::String),
            "datetime64[ns]" | "datetime" | "timestamp" => Ok(TargetType::Timestamp),
            other => Err(SchemaError::UnknownType(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("expected schema must declare at least one column")]
    Empty,
    #[error("column '{0}' is declared more than once")]
    DuplicateColumn(String),
    #[error("unknown target type '{0}'")]
    UnknownType(String),
}

/// Ordered column → type mapping. Names are stored lowercased; their order
/// is the canonical output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedSchema {
    columns: Vec<(String, TargetType)>,
}

impl ExpectedSchema {
    pub fn new<I, S>(columns: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (S, TargetType)>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (name, ty) in columns {
            let name = normalize_name(name.as_ref());
            if !seen.insert(name.clone()) {
                return Err(SchemaError::DuplicateColumn(name));
            }
            out.push((name, ty));
        }
        if out.is_empty() {
            return Err(SchemaError::Empty);
        }
        Ok(Self { columns: out })
    }

    /// Build from `(name, type-name)` pairs such as `("VendorID", "int")`.
    pub fn parse<'a, I>(columns: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let typed = columns
            .into_iter()
            .map(|(name, ty)| ty.parse::<TargetType>().map(|t| (name, t)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(typed)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TargetType)> {
        self.columns.iter().map(|(n, t)| (n.as_str(), *t))
    }
}

/// Column names compare after trimming and lowercasing.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}
