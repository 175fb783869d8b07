use crate::api::{DatFile, DecodeOptions, DecodedTable, decode_table};
use crate::bundle::{BundleProvider, DirListing};
use crate::error::{Error, Result};
use crate::parser::DecodeCoordinator;
use crate::schema::{
    RowStats, SchemaProvider, TableSchema, schema_name_from_path, suggest_headers,
};

/// Ties the bundle tree, the schema store, and the decoder together.
///
/// Collaborators are constructed once at startup and passed in by reference.
/// Every `open_table` begins a new decode request on the coordinator, so a
/// table opened while an earlier decode is still in flight supersedes it;
/// the superseded decode aborts and its partial rows are never delivered.
pub struct Browser<'p, B: BundleProvider, S: SchemaProvider> {
    bundle: &'p B,
    schemas: &'p S,
    coordinator: DecodeCoordinator,
}

impl<'p, B: BundleProvider, S: SchemaProvider> Browser<'p, B, S> {
    #[must_use]
    pub fn new(bundle: &'p B, schemas: &'p S) -> Self {
        Self {
            bundle,
            schemas,
            coordinator: DecodeCoordinator::new(),
        }
    }

    /// Lists the bundle's top-level directories.
    ///
    /// # Errors
    ///
    /// Propagates bundle provider failures.
    pub fn list_root_directories(&self) -> Result<Vec<String>> {
        self.bundle.list_root_directories()
    }

    /// Lists one directory level of the bundle.
    ///
    /// # Errors
    ///
    /// Propagates bundle provider failures.
    pub fn list_directory(&self, path: &str) -> Result<DirListing> {
        self.bundle.list_directory(path)
    }

    /// Loads and decodes the table at `path` using the schema derived from
    /// its name.
    ///
    /// A missing schema is a typed [`Error::SchemaNotFound`], never a silent
    /// drop; the caller decides whether to fall back to
    /// [`Self::suggest_schema`].
    ///
    /// # Errors
    ///
    /// [`Error::SchemaNotFound`], bundle I/O failures, and every file-level
    /// decode failure of [`crate::decode_file`].
    pub fn open_table(&self, path: &str, options: &DecodeOptions) -> Result<DecodedTable<'static>> {
        let name = schema_name_from_path(path);
        let schema = self
            .schemas
            .find_headers_by_name(name)
            .ok_or_else(|| Error::SchemaNotFound {
                name: name.to_owned(),
            })?;
        let bytes = self.bundle.load_file_content(path)?;
        let ticket = self.coordinator.begin();
        let options = options.clone().with_ticket(ticket);
        let file = DatFile::parse(&bytes)?;
        let table = decode_table(&file, schema, &options)?;
        Ok(table.into_owned())
    }

    /// Proposes a candidate schema for a table with no known headers, from
    /// byte-width statistics over its rows.
    ///
    /// # Errors
    ///
    /// Bundle I/O failures and [`Error::MalformedTable`] for files whose
    /// geometry cannot be parsed.
    pub fn suggest_schema(&self, path: &str) -> Result<TableSchema> {
        let bytes = self.bundle.load_file_content(path)?;
        let file = DatFile::parse(&bytes)?;
        let stats = RowStats::gather(file.view(), file.heap());
        Ok(TableSchema::new(
            schema_name_from_path(path),
            suggest_headers(&stats),
        ))
    }
}
