pub mod arrow;
pub mod categories;
pub mod types;

pub use arrow::{map_to_arrow_type, matches_target};
pub use categories::Category;
pub use types::{normalize_name, ExpectedSchema, SchemaError, TargetType};
