use std::borrow::Cow;
use std::fmt;

/// Represents a single cell value produced by the dat decoder.
///
/// Every decoded cell carries its type explicitly; rendering layers match on
/// the tag instead of guessing from the schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// Single-byte boolean; any nonzero byte is true.
    Bool(bool),
    /// Integer narrow enough for 32 bits (widths up to 4 bytes).
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// Unsigned 64-bit integer that does not fit `i64`.
    UInt64(u64),
    /// IEEE754 floating point number; binary32 values are widened.
    Float(f64),
    /// UTF-8 string resolved from the heap.
    Str(Cow<'a, str>),
    /// Array resolved from the heap, one variant per element.
    Array(Vec<Value<'a>>),
    /// Row index into a foreign table.
    ForeignRow(u32),
    /// Null reference (a foreign key carrying the null sentinel).
    Null,
    /// Per-cell decode failure; the rest of the table is unaffected.
    Error(CellError),
}

impl Value<'_> {
    #[must_use]
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Bool(v) => Value::Bool(v),
            Value::Int32(v) => Value::Int32(v),
            Value::Int64(v) => Value::Int64(v),
            Value::UInt64(v) => Value::UInt64(v),
            Value::Float(v) => Value::Float(v),
            Value::Str(s) => Value::Str(Cow::Owned(s.into_owned())),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::into_owned).collect())
            }
            Value::ForeignRow(index) => Value::ForeignRow(index),
            Value::Null => Value::Null,
            Value::Error(err) => Value::Error(err),
        }
    }

    /// True when the cell decoded to an error sentinel.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Recoverable per-cell decode failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellError {
    /// A heap reference whose resolved range exceeds the heap length.
    HeapBounds { base: u32, length: u64 },
    /// Heap bytes that could not be decoded as text.
    Encoding { details: Cow<'static, str> },
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeapBounds { base, length } => {
                write!(f, "heap reference {base}+{length} out of bounds")
            }
            Self::Encoding { details } => write!(f, "text decode failed: {details}"),
        }
    }
}
