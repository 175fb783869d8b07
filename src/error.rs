use std::borrow::Cow;
use std::fmt;
use std::io;

/// Result type used across the dat decoder.
pub type Result<T> = std::result::Result<T, Error>;

/// File-level error type surfaced by the decoder and its collaborators.
///
/// Per-cell failures (bad heap bounds, bad text encoding) are not represented
/// here; they decode to [`crate::value::Value::Error`] sentinels and never
/// escalate to a file-level failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O failure while loading bundle content or writing a sink.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The file's row/heap geometry is inconsistent; nothing can be decoded.
    #[error("malformed table while processing {section}: {details}")]
    MalformedTable {
        section: Section,
        details: Cow<'static, str>,
    },

    /// The candidate header set does not fit the observed row stride.
    #[error("schema '{schema}' does not match file layout: {details}")]
    SchemaMismatch {
        schema: Cow<'static, str>,
        details: Cow<'static, str>,
    },

    /// No header set is known for the derived schema name.
    #[error("no schema found for '{name}'")]
    SchemaNotFound { name: String },

    /// A schema definition could not be interpreted.
    #[error("invalid schema definition: {details}")]
    InvalidSchema { details: Cow<'static, str> },

    /// Row index beyond the declared row count. Indicates a caller bug, not a
    /// data condition.
    #[error("row index {index} out of range for table with {count} rows")]
    IndexOutOfRange { index: u64, count: u64 },

    /// The decode was superseded by a newer request and its results were
    /// discarded.
    #[error("decode superseded by a newer request")]
    Superseded,

    /// Failure encountered while writing rows into a sink.
    #[error("sink error: {details}")]
    Sink { details: Cow<'static, str> },
}

/// Logical section of a dat file used for diagnostic reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Preamble,
    RowSection,
    Heap,
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::Sink {
            details: Cow::Owned(err.to_string()),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preamble => write!(f, "file preamble"),
            Self::RowSection => write!(f, "fixed-stride row section"),
            Self::Heap => write!(f, "variable-length heap"),
        }
    }
}
