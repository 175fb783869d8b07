pub mod api;
pub mod browser;
pub mod bundle;
pub mod error;
pub mod logger;
pub mod parser;
pub mod schema;
pub mod sinks;
pub mod value;

pub use crate::error::{Error, Result};
pub use api::{DatFile, DecodeOptions, DecodedTable, Row, decode_file, decode_table};
pub use browser::Browser;
pub use sinks::{CsvSink, RowSink, SinkContext};
pub use value::{CellError, Value};
