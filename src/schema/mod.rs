mod infer;
mod matcher;
mod provider;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub use infer::{RowStats, suggest_headers};
pub use matcher::match_headers;
pub use provider::{JsonSchemaStore, SchemaProvider, schema_name_from_path};

/// Byte order declared by a schema for all fixed-width fields in its rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Character encoding of heap string payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// The format's native string encoding.
    #[default]
    #[serde(rename = "utf16le")]
    Utf16Le,
    Utf8,
}

/// Tagged value interpretation of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnType {
    Bool,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// Heap reference: `u32` base + `u32` byte length read from the row.
    String,
    /// Heap reference: `u32` base + `u32` element count read from the row.
    Array { element: Box<ColumnType> },
    /// Inline `u32` row index into another table; `0xFEFE_FEFE` is null.
    #[serde(rename = "foreignrow")]
    ForeignRow,
}

impl ColumnType {
    /// Byte width the type occupies within a row (or within an array's heap
    /// run, for element types).
    #[must_use]
    pub const fn width(&self) -> u32 {
        match self {
            Self::Bool => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 | Self::ForeignRow => 4,
            Self::I64 | Self::U64 | Self::F64 | Self::String | Self::Array { .. } => 8,
        }
    }

    /// True for types resolved through the heap rather than read inline.
    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(self, Self::String | Self::Array { .. })
    }
}

/// Column descriptor supplied by an external schema definition.
///
/// `name` may be absent; the matcher assigns a positional placeholder so row
/// keys are always populated. `length` fixes the element count of an array
/// reference, overriding the in-row count field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub offset: u32,
    #[serde(flatten)]
    pub ty: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

/// Named candidate header set for one table, keyed by schema name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    #[serde(default)]
    pub endianness: Endianness,
    #[serde(default)]
    pub text_encoding: TextEncoding,
    pub headers: Vec<Header>,
}

impl TableSchema {
    #[must_use]
    pub fn new(name: impl Into<String>, headers: Vec<Header>) -> Self {
        Self {
            name: name.into(),
            endianness: Endianness::default(),
            text_encoding: TextEncoding::default(),
            headers,
        }
    }
}

/// Header set validated against an observed stride, with every column named.
///
/// Immutable for the duration of one decode; the disambiguated names are
/// shared with every materialized row.
#[derive(Debug, Clone)]
pub struct ValidatedHeaders {
    schema_name: String,
    columns: Vec<BoundColumn>,
    names: Arc<[String]>,
    stride: u32,
    endianness: Endianness,
    text_encoding: TextEncoding,
}

/// One validated column: a header with its final (placeholder-resolved,
/// collision-free) name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundColumn {
    pub name: String,
    pub offset: u32,
    pub ty: ColumnType,
    pub length: Option<u32>,
}

impl ValidatedHeaders {
    pub(crate) fn new(
        schema_name: String,
        columns: Vec<BoundColumn>,
        stride: u32,
        endianness: Endianness,
        text_encoding: TextEncoding,
    ) -> Self {
        let names: Arc<[String]> = columns.iter().map(|c| c.name.clone()).collect();
        Self {
            schema_name,
            columns,
            names,
            stride,
            endianness,
            text_encoding,
        }
    }

    #[must_use]
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    #[must_use]
    pub fn columns(&self) -> &[BoundColumn] {
        &self.columns
    }

    #[must_use]
    pub fn names(&self) -> &Arc<[String]> {
        &self.names
    }

    #[must_use]
    pub const fn stride(&self) -> u32 {
        self.stride
    }

    #[must_use]
    pub const fn endianness(&self) -> Endianness {
        self.endianness
    }

    #[must_use]
    pub const fn text_encoding(&self) -> TextEncoding {
        self.text_encoding
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Restricts the set to the named columns, preserving schema order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidSchema`] if a requested name is
    /// unknown.
    pub fn project(&self, names: &[String]) -> crate::Result<Self> {
        let mut indices: SmallVec<[usize; 8]> = SmallVec::new();
        for requested in names {
            let Some(index) = self.columns.iter().position(|c| &c.name == requested) else {
                return Err(crate::Error::InvalidSchema {
                    details: format!("projected column '{requested}' not in schema").into(),
                });
            };
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
        indices.sort_unstable();
        let columns = indices.iter().map(|&i| self.columns[i].clone()).collect();
        Ok(Self::new(
            self.schema_name.clone(),
            columns,
            self.stride,
            self.endianness,
            self.text_encoding,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_widths() {
        assert_eq!(ColumnType::Bool.width(), 1);
        assert_eq!(ColumnType::U16.width(), 2);
        assert_eq!(ColumnType::F32.width(), 4);
        assert_eq!(ColumnType::ForeignRow.width(), 4);
        assert_eq!(ColumnType::String.width(), 8);
        assert_eq!(
            ColumnType::Array {
                element: Box::new(ColumnType::I64)
            }
            .width(),
            8
        );
    }

    #[test]
    fn schema_json_round_trip() {
        let schema = TableSchema::new(
            "BaseItemTypes",
            vec![
                Header {
                    name: Some("Id".into()),
                    offset: 0,
                    ty: ColumnType::String,
                    length: None,
                },
                Header {
                    name: None,
                    offset: 8,
                    ty: ColumnType::Array {
                        element: Box::new(ColumnType::I32),
                    },
                    length: None,
                },
            ],
        );
        let json = serde_json::to_string(&schema).unwrap();
        let back: TableSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn header_json_shape() {
        let json = r#"{"name":"Level","offset":4,"type":"i32"}"#;
        let header: Header = serde_json::from_str(json).unwrap();
        assert_eq!(header.ty, ColumnType::I32);
        assert_eq!(header.offset, 4);
    }
}
