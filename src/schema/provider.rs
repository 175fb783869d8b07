use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Error, Result};
use crate::schema::TableSchema;

/// Directory prefix under which tables live in the bundle tree.
const DATA_PREFIX: &str = "data/";

/// Table file extensions, longest first so `.dat64` wins over `.dat`.
const DAT_EXTENSIONS: [&str; 2] = [".dat64", ".dat"];

/// Source of candidate header sets, keyed by schema name.
///
/// Constructed once at startup and passed by reference into the browser; the
/// core never resolves schemas on its own.
pub trait SchemaProvider {
    /// Looks up the candidate header set for `schema_name`, or `None` when
    /// the table is unknown.
    fn find_headers_by_name(&self, schema_name: &str) -> Option<&TableSchema>;
}

/// Derives the schema lookup name from a bundle path: the `data/` prefix and
/// the table extension are stripped, both case-insensitively.
///
/// The derivation is deterministic so repeated visits to one file always
/// consult the same schema entry.
#[must_use]
pub fn schema_name_from_path(path: &str) -> &str {
    let mut name = path;
    if name.len() >= DATA_PREFIX.len() && name[..DATA_PREFIX.len()].eq_ignore_ascii_case(DATA_PREFIX)
    {
        name = &name[DATA_PREFIX.len()..];
    }
    for extension in DAT_EXTENSIONS {
        if name.len() > extension.len()
            && name[name.len() - extension.len()..].eq_ignore_ascii_case(extension)
        {
            name = &name[..name.len() - extension.len()];
            break;
        }
    }
    name
}

/// Schema store backed by a JSON document: a flat array of table schemas.
///
/// Lookup is case-insensitive; bundle paths and schema definitions disagree
/// on casing often enough that exact matching loses real tables.
#[derive(Debug, Default)]
pub struct JsonSchemaStore {
    schemas: HashMap<String, TableSchema>,
}

impl JsonSchemaStore {
    /// Parses a schema store from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] when the document does not parse as
    /// an array of table schemas.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let schemas: Vec<TableSchema> =
            serde_json::from_slice(bytes).map_err(|err| Error::InvalidSchema {
                details: err.to_string().into(),
            })?;
        let mut store = Self::default();
        for schema in schemas {
            store.insert(schema);
        }
        Ok(store)
    }

    /// Loads a schema store from a JSON file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let schemas: Vec<TableSchema> = serde_json::from_reader(BufReader::new(file))
            .map_err(|err| Error::InvalidSchema {
                details: err.to_string().into(),
            })?;
        let mut store = Self::default();
        for schema in schemas {
            store.insert(schema);
        }
        Ok(store)
    }

    /// Adds or replaces one schema; the last definition for a name wins.
    pub fn insert(&mut self, schema: TableSchema) {
        self.schemas.insert(schema.name.to_ascii_lowercase(), schema);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl SchemaProvider for JsonSchemaStore {
    fn find_headers_by_name(&self, schema_name: &str) -> Option<&TableSchema> {
        self.schemas.get(&schema_name.to_ascii_lowercase())
    }
}
