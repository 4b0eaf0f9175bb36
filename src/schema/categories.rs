// src/schema/categories.rs

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf};

use super::types::{ExpectedSchema, TargetType};
use super::types::TargetType::{Float, Integer, String as Str, Timestamp};

/// The four trip-record industries, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Yellow,
    Green,
    Fhv,
    Hvfhv,
}

const YELLOW: &[(&str, TargetType)] = &[
    ("VendorID", Integer),
    ("tpep_pickup_datetime", Timestamp),
    ("tpep_dropoff_datetime", Timestamp),
    ("passenger_count", Integer),
    ("trip_distance", Float),
    ("PULocationID", Integer),
    ("DOLocationID", Integer),
    ("RatecodeID", Integer),
    ("store_and_fwd_flag", Str),
    ("payment_type", Integer),
    ("fare_amount", Float),
    ("extra", Float),
    ("mta_tax", Float),
    ("improvement_surcharge", Float),
    ("tip_amount", Float),
    ("tolls_amount", Float),
    ("total_amount", Float),
    ("congestion_surcharge", Float),
    ("airport_fee", Float),
];

const GREEN: &[(&str, TargetType)] = &[
    ("VendorID", Integer),
    ("lpep_pickup_datetime", Timestamp),
    ("lpep_dropoff_datetime", Timestamp),
    ("passenger_count", Integer),
    ("trip_distance", Float),
    ("PULocationID", Integer),
    ("DOLocationID", Integer),
    ("RatecodeID", Integer),
    ("store_and_fwd_flag", Str),
    ("payment_type", Integer),
    ("fare_amount", Float),
    ("extra", Float),
    ("mta_tax", Float),
    ("tip_amount", Float),
    ("tolls_amount", Float),
    ("total_amount", Float),
    ("trip_type", Integer),
];

const FHV: &[(&str, TargetType)] = &[
    ("dispatching_base_num", Str),
    ("pickup_datetime", Timestamp),
    ("dropOff_datetime", Timestamp),
    ("PUlocationID", Integer),
    ("DOlocationID", Integer),
    ("SR_Flag", Integer),
    ("Affiliated_base_number", Str),
];

const HVFHV: &[(&str, TargetType)] = &[
    ("hvfhs_license_num", Str),
    ("dispatching_base_num", Str),
    ("pickup_datetime", Timestamp),
    ("dropoff_datetime", Timestamp),
    ("PULocationID", Integer),
    ("DOLocationID", Integer),
    ("originating_base_num", Str),
    ("request_datetime", Timestamp),
    ("on_scene_datetime", Timestamp),
    ("trip_miles", Float),
    ("trip_time", Timestamp),
    ("base_passenger_fare", Float),
    ("tolls", Float),
    ("bcf", Float),
    ("sales_tax", Float),
    ("congestion_surcharge", Float),
    ("airport_fee", Float),
    ("tips", Float),
    ("driver_pay", Float),
    ("shared_request_flag", Str),
    ("shared_match_flag", Str),
];

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Yellow,
        Category::Green,
        Category::Fhv,
        Category::Hvfhv,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Yellow => "yellow",
            Category::Green => "green",
            Category::Fhv => "fhv",
            Category::Hvfhv => "hvfhv",
        }
    }

    /// Directory layout used when no config overrides it.
    pub fn default_directory(&self) -> PathBuf {
        let leaf = match self {
            Category::Yellow => "Yellow_Trip",
            Category::Green => "Green_Trip",
            Category::Fhv => "FHV_Trips",
            Category::Hvfhv => "High_volume_For_Hire_Trips",
        };
        PathBuf::from("TLC_Trip_Record_Data").join(leaf)
    }

    fn columns(&self) -> &'static [(&'static str, TargetType)] {
        match self {
            Category::Yellow => YELLOW,
            Category::Green => GREEN,
            Category::Fhv => FHV,
            Category::Hvfhv => HVFHV,
        }
    }

    pub fn schema(&self) -> Result<ExpectedSchema> {
        Ok(ExpectedSchema::new(self.columns().iter().copied())?)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_a_valid_schema() {
        let sizes: Vec<_> = Category::ALL
            .iter()
            .map(|c| c.schema().map(|s| s.len()))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(sizes, vec![19, 17, 7, 21]);
    }

    #[test]
    fn fhv_schema_is_lowercased_in_declared_order() {
        let schema = Category::Fhv.schema().unwrap();
        let names: Vec<_> = schema.names().collect();
        assert_eq!(
            names,
            vec![
                "dispatching_base_num",
                "pickup_datetime",
                "dropoff_datetime",
                "pulocationid",
                "dolocationid",
                "sr_flag",
                "affiliated_base_number",
            ]
        );
    }

    #[test]
    fn default_directories_follow_data_layout() {
        assert_eq!(
            Category::Hvfhv.default_directory(),
            PathBuf::from("TLC_Trip_Record_Data/High_volume_For_Hire_Trips")
        );
    }
}
