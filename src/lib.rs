//! chartscope - load CSV files into typed datasets
//!
//! A session carries memory limits; its reader loads a delimited file,
//! optionally inferring column types and taking column names from a header,
//! into an immutable in-memory [`Dataset`] that can be sampled and inspected.

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod reader;
pub mod session;

pub use config::{ByteSize, ReadOptions, SessionConfig};
pub use error::{Error, Result};
pub use model::{DataType, Dataset, Row, Value};
pub use reader::{load_dataset, DataFrameReader};
pub use session::{Session, SessionBuilder};
