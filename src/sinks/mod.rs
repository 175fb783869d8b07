mod csv;

pub use csv::CsvSink;

use crate::error::Result;
use crate::parser::Row;
use crate::schema::ValidatedHeaders;

/// Provides header information to sinks during initialisation.
pub struct SinkContext<'a> {
    pub headers: &'a ValidatedHeaders,
}

impl<'a> SinkContext<'a> {
    #[must_use]
    pub const fn new(headers: &'a ValidatedHeaders) -> Self {
        Self { headers }
    }
}

/// Trait implemented by sinks that consume decoded rows.
pub trait RowSink {
    /// Called before any rows are written to allow the sink to initialise
    /// internal state.
    ///
    /// # Errors
    ///
    /// Implementations report initialisation failures.
    fn begin(&mut self, context: SinkContext<'_>) -> Result<()>;

    /// Invoked for every decoded row in table order.
    ///
    /// # Errors
    ///
    /// Implementations report write failures.
    fn write_row(&mut self, row: &Row<'_>) -> Result<()>;

    /// Called once all rows have been forwarded to the sink.
    ///
    /// # Errors
    ///
    /// Implementations report flush failures.
    fn finish(&mut self) -> Result<()>;
}

/// Streams a decoded table through a sink from start to finish.
///
/// # Errors
///
/// Propagates sink failures.
pub fn stream_into<S: RowSink>(
    headers: &ValidatedHeaders,
    rows: &[Row<'_>],
    sink: &mut S,
) -> Result<()> {
    sink.begin(SinkContext::new(headers))?;
    for row in rows {
        sink.write_row(row)?;
    }
    sink.finish()
}
