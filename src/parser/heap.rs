use std::borrow::Cow;

use crate::parser::encoding::decode_text;
use crate::schema::TextEncoding;
use crate::value::CellError;

/// Reference into the variable-length heap, as stored in a row field:
/// a base offset relative to the heap start plus an element count.
///
/// For string references the count is the byte length; offsets are unsigned
/// on disk, so a negative base is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapRef {
    pub base: u32,
    pub count: u32,
}

/// Bounds-checked resolver over the heap region trailing the row section.
///
/// The heap begins with the 8-byte variable-data marker; offsets recorded in
/// rows are relative to the marker start.
#[derive(Debug, Clone, Copy)]
pub struct Heap<'data> {
    bytes: &'data [u8],
}

impl<'data> Heap<'data> {
    #[must_use]
    pub const fn new(bytes: &'data [u8]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Resolves `reference` to `element_width * count` bytes starting at its
    /// base. A range reaching exactly the heap end is valid; one byte past is
    /// a [`CellError::HeapBounds`].
    pub fn resolve(
        &self,
        reference: HeapRef,
        element_width: u32,
    ) -> Result<&'data [u8], CellError> {
        let length = u64::from(element_width) * u64::from(reference.count);
        let end = u64::from(reference.base) + length;
        if end > self.bytes.len() as u64 {
            return Err(CellError::HeapBounds {
                base: reference.base,
                length,
            });
        }
        let start = reference.base as usize;
        Ok(&self.bytes[start..start + length as usize])
    }

    /// Resolves a string reference and decodes it as text.
    ///
    /// The byte length is the explicit prefix read from the row field (the
    /// reference count), not scanned from the heap.
    pub fn resolve_string(
        &self,
        reference: HeapRef,
        encoding: TextEncoding,
    ) -> Result<Cow<'data, str>, CellError> {
        let bytes = self.resolve(reference, 1)?;
        decode_text(bytes, encoding)
    }

    /// True when a `(base, count)` pair at the given element width would
    /// bounds-check. Used by header inference, which probes candidate
    /// reference positions without decoding.
    #[must_use]
    pub fn contains(&self, reference: HeapRef, element_width: u32) -> bool {
        u64::from(reference.base) + u64::from(element_width) * u64::from(reference.count)
            <= self.bytes.len() as u64
    }
}
