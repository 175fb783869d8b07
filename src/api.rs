use std::borrow::Cow;

use crate::error::{Error, Result, Section};
use crate::parser::{DecodeTicket, Heap, TableView, materialize};
use crate::schema::{TableSchema, ValidatedHeaders, match_headers};

pub use crate::parser::Row;

/// Marker opening the variable-length heap; everything before it (after the
/// preamble) is the fixed-stride row section.
pub const HEAP_MARKER: [u8; 8] = [0xBB; 8];

/// A dat file split into its row section and heap.
///
/// The preamble is a little-endian `u32` row count regardless of the byte
/// order a schema declares for row fields. The row stride is derived, not
/// stored: `(marker offset - 4) / row count`.
#[derive(Debug, Clone, Copy)]
pub struct DatFile<'data> {
    view: TableView<'data>,
    heap: Heap<'data>,
}

impl<'data> DatFile<'data> {
    /// Splits raw file bytes into preamble, row section, and heap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedTable`] when the preamble is truncated, the
    /// heap marker is missing, or the row-section length is inconsistent
    /// with the declared row count.
    pub fn parse(bytes: &'data [u8]) -> Result<Self> {
        let Some(preamble) = bytes.get(..4) else {
            return Err(Error::MalformedTable {
                section: Section::Preamble,
                details: Cow::from("file too short for a row-count preamble"),
            });
        };
        let row_count = u32::from_le_bytes(preamble.try_into().expect("4-byte slice"));
        let body = &bytes[4..];
        let Some(marker) = find_heap_marker(body) else {
            return Err(Error::MalformedTable {
                section: Section::Heap,
                details: Cow::from("variable-data marker not found"),
            });
        };
        let (rows, heap) = body.split_at(marker);
        let view = TableView::new(rows, row_count)?;
        Ok(Self {
            view,
            heap: Heap::new(heap),
        })
    }

    #[must_use]
    pub const fn view(&self) -> &TableView<'data> {
        &self.view
    }

    #[must_use]
    pub const fn heap(&self) -> &Heap<'data> {
        &self.heap
    }

    #[must_use]
    pub const fn row_count(&self) -> u32 {
        self.view.row_count()
    }

    #[must_use]
    pub const fn stride(&self) -> u32 {
        self.view.stride()
    }
}

fn find_heap_marker(body: &[u8]) -> Option<usize> {
    if body.len() < HEAP_MARKER.len() {
        return None;
    }
    body.windows(HEAP_MARKER.len())
        .position(|window| window == HEAP_MARKER)
}

/// Configures one decode invocation.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    allow_partial: bool,
    parallel: bool,
    max_rows: Option<u32>,
    columns: Option<Vec<String>>,
    ticket: Option<DecodeTicket>,
}

impl DecodeOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            allow_partial: false,
            parallel: false,
            max_rows: None,
            columns: None,
            ticket: None,
        }
    }

    /// Opt into degraded decoding: headers that do not fit the stride are
    /// dropped (and logged) instead of failing the whole file.
    #[must_use]
    pub const fn with_partial_headers(mut self) -> Self {
        self.allow_partial = true;
        self
    }

    /// Decode columns on the rayon pool instead of serially.
    #[must_use]
    pub const fn with_parallel_columns(mut self) -> Self {
        self.parallel = true;
        self
    }

    /// Materialize at most `count` rows.
    #[must_use]
    pub const fn with_max_rows(mut self, count: u32) -> Self {
        self.max_rows = Some(count);
        self
    }

    /// Project a subset of columns by name, preserving schema order.
    #[must_use]
    pub fn with_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let collected: Vec<String> = names.into_iter().map(Into::into).collect();
        self.columns = if collected.is_empty() {
            None
        } else {
            Some(collected)
        };
        self
    }

    /// Attach a supersession ticket; the decode aborts with
    /// [`Error::Superseded`] once a newer request begins.
    #[must_use]
    pub fn with_ticket(mut self, ticket: DecodeTicket) -> Self {
        self.ticket = Some(ticket);
        self
    }
}

/// A fully decoded table: validated headers plus one record per row.
#[derive(Debug, Clone)]
pub struct DecodedTable<'data> {
    pub headers: ValidatedHeaders,
    pub rows: Vec<Row<'data>>,
}

impl DecodedTable<'_> {
    #[must_use]
    pub fn into_owned(self) -> DecodedTable<'static> {
        DecodedTable {
            headers: self.headers,
            rows: self.rows.into_iter().map(Row::into_owned).collect(),
        }
    }
}

/// Decodes raw dat bytes against a candidate header set.
///
/// # Errors
///
/// File-level failures only: [`Error::MalformedTable`],
/// [`Error::SchemaMismatch`] (unless partial decoding was requested),
/// [`Error::Superseded`]. Cell-level problems surface as error sentinels
/// inside the rows.
pub fn decode_file<'data>(
    bytes: &'data [u8],
    schema: &TableSchema,
    options: &DecodeOptions,
) -> Result<DecodedTable<'data>> {
    let file = DatFile::parse(bytes)?;
    decode_table(&file, schema, options)
}

/// Decodes an already-split [`DatFile`].
///
/// # Errors
///
/// As [`decode_file`].
pub fn decode_table<'data>(
    file: &DatFile<'data>,
    schema: &TableSchema,
    options: &DecodeOptions,
) -> Result<DecodedTable<'data>> {
    // An empty table has no observable stride; headers validate trivially
    // since there are no rows to mis-decode.
    let stride = if file.row_count() == 0 {
        schema
            .headers
            .iter()
            .map(|h| h.offset.saturating_add(h.ty.width()))
            .max()
            .unwrap_or(0)
    } else {
        file.stride()
    };
    let mut headers = match_headers(schema, stride, options.allow_partial)?;
    if let Some(names) = &options.columns {
        headers = headers.project(names)?;
    }

    let view = options
        .max_rows
        .map_or_else(|| *file.view(), |limit| file.view().truncate(limit));
    let rows = materialize(
        &view,
        file.heap(),
        &headers,
        options.parallel,
        options.ticket.as_ref(),
    )?;
    Ok(DecodedTable { headers, rows })
}
