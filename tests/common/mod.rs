#![allow(dead_code)]

use datview::schema::{ColumnType, Header, TableSchema};

/// Builds synthetic dat files: little-endian row-count preamble, fixed-width
/// rows, then the variable-data marker followed by heap bytes.
pub struct DatBuilder {
    rows: Vec<Vec<u8>>,
    heap: Vec<u8>,
}

pub const HEAP_MARKER: [u8; 8] = [0xBB; 8];

impl DatBuilder {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            heap: HEAP_MARKER.to_vec(),
        }
    }

    /// Appends a fixed-width row; all rows must end up the same width.
    pub fn row(&mut self, bytes: Vec<u8>) -> &mut Self {
        self.rows.push(bytes);
        self
    }

    /// Appends UTF-16LE text to the heap, returning `(base, byte_length)`
    /// for embedding in a row field.
    pub fn heap_string(&mut self, text: &str) -> (u32, u32) {
        let base = self.heap.len() as u32;
        let bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        let length = bytes.len() as u32;
        self.heap.extend(bytes);
        (base, length)
    }

    /// Appends raw bytes to the heap, returning the base offset.
    pub fn heap_bytes(&mut self, bytes: &[u8]) -> u32 {
        let base = self.heap.len() as u32;
        self.heap.extend_from_slice(bytes);
        base
    }

    pub fn heap_len(&self) -> u32 {
        self.heap.len() as u32
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend((self.rows.len() as u32).to_le_bytes());
        for row in &self.rows {
            out.extend_from_slice(row);
        }
        out.extend_from_slice(&self.heap);
        out
    }
}

pub fn header(name: Option<&str>, offset: u32, ty: ColumnType) -> Header {
    Header {
        name: name.map(str::to_owned),
        offset,
        ty,
        length: None,
    }
}

pub fn schema(name: &str, headers: Vec<Header>) -> TableSchema {
    TableSchema::new(name, headers)
}

/// Field bytes for a `(base, count)` heap reference.
pub fn ref_field(base: u32, count: u32) -> Vec<u8> {
    let mut field = Vec::with_capacity(8);
    field.extend(base.to_le_bytes());
    field.extend(count.to_le_bytes());
    field
}
