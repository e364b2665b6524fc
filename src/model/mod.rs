//! Data model for loaded tabular data

mod columnar;
mod schema;
mod table;

pub use schema::{DataType, Field, Schema};
pub use table::{Dataset, Row, Value};
