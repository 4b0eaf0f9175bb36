pub mod config;
pub mod process;
pub mod schema;
pub mod validate;
