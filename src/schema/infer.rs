use crate::parser::byteorder::read_u32;
use crate::parser::{Heap, HeapRef, TableView};
use crate::schema::{ColumnType, Endianness, Header};

/// Per-byte-offset statistics over the whole row section.
///
/// True schemas are not embedded in the file, so column boundaries inside the
/// stride must be inferred. These facts drive the heuristics: a byte that is
/// zero in every row is padding or the high half of a narrow value; an offset
/// where a `u32 + u32` pair bounds-checks against the heap in every row is a
/// plausible reference field.
///
/// Gathering assumes little-endian rows; inference is a heuristic for files
/// with no known schema, not a substitute for one.
#[derive(Debug, Clone)]
pub struct RowStats {
    stride: u32,
    row_count: u32,
    zero_everywhere: Vec<bool>,
    max_byte: Vec<u8>,
    string_ref: Vec<bool>,
    array_ref: Vec<bool>,
}

const INFER_ENDIAN: Endianness = Endianness::Little;

impl RowStats {
    /// Single pass over rows gathering byte-level facts, then a second pass
    /// probing each viable offset for reference plausibility.
    #[must_use]
    pub fn gather(view: &TableView<'_>, heap: &Heap<'_>) -> Self {
        let stride = view.stride() as usize;
        let mut zero_everywhere = vec![true; stride];
        let mut max_byte = vec![0u8; stride];
        for row in view.iter() {
            for (offset, &byte) in row.iter().enumerate() {
                if byte != 0 {
                    zero_everywhere[offset] = false;
                }
                if byte > max_byte[offset] {
                    max_byte[offset] = byte;
                }
            }
        }

        let mut string_ref = vec![false; stride];
        let mut array_ref = vec![false; stride];
        for offset in 0..stride.saturating_sub(7) {
            let mut string_ok = view.row_count() > 0;
            let mut array_ok = string_ok;
            let mut any_nonempty = false;
            for row in view.iter() {
                let base = read_u32(INFER_ENDIAN, &row[offset..]);
                let count = read_u32(INFER_ENDIAN, &row[offset + 4..]);
                let reference = HeapRef { base, count };
                if count > 0 {
                    any_nonempty = true;
                }
                // String counts are byte lengths; the native encoding is
                // two-byte units, so odd lengths rule a string out.
                if count % 2 != 0 || !heap.contains(reference, 1) {
                    string_ok = false;
                }
                if !heap.contains(reference, 1) {
                    array_ok = false;
                }
                if !string_ok && !array_ok {
                    break;
                }
            }
            string_ref[offset] = string_ok && any_nonempty;
            array_ref[offset] = array_ok && any_nonempty;
        }

        Self {
            stride: view.stride(),
            row_count: view.row_count(),
            zero_everywhere,
            max_byte,
            string_ref,
            array_ref,
        }
    }

    #[must_use]
    pub const fn stride(&self) -> u32 {
        self.stride
    }

    #[must_use]
    pub const fn row_count(&self) -> u32 {
        self.row_count
    }

    /// True when the byte at `offset` is zero in every row.
    #[must_use]
    pub fn is_zero_everywhere(&self, offset: u32) -> bool {
        self.zero_everywhere.get(offset as usize).copied().unwrap_or(true)
    }

    #[must_use]
    pub fn max_byte(&self, offset: u32) -> u8 {
        self.max_byte.get(offset as usize).copied().unwrap_or(0)
    }

    /// True when a string reference at `offset` bounds-checks in every row.
    #[must_use]
    pub fn is_plausible_string_ref(&self, offset: u32) -> bool {
        self.string_ref.get(offset as usize).copied().unwrap_or(false)
    }

    /// True when an array reference at `offset` bounds-checks in every row.
    #[must_use]
    pub fn is_plausible_array_ref(&self, offset: u32) -> bool {
        self.array_ref.get(offset as usize).copied().unwrap_or(false)
    }
}

/// Proposes a candidate header set for a table with no known schema.
///
/// Greedy left-to-right walk over the stride: take a string reference where
/// one is plausible, otherwise fall back to the widest scalar that still
/// fits. Headers come back unnamed; the matcher assigns placeholders.
#[must_use]
pub fn suggest_headers(stats: &RowStats) -> Vec<Header> {
    let mut headers = Vec::new();
    let mut offset = 0u32;
    while offset < stats.stride() {
        let remaining = stats.stride() - offset;
        let ty = if remaining >= 8 && stats.is_plausible_string_ref(offset) {
            ColumnType::String
        } else if remaining >= 4 {
            ColumnType::I32
        } else if remaining >= 2 {
            ColumnType::I16
        } else {
            ColumnType::Bool
        };
        let width = ty.width();
        headers.push(Header {
            name: None,
            offset,
            ty,
            length: None,
        });
        offset += width;
    }
    headers
}
