use std::borrow::Cow;

use crate::error::{Error, Result, Section};

/// Read-only cursor over the fixed-stride row section of a dat file.
///
/// The stride is not recorded in the file; it is derived from the row-section
/// length and the preamble-declared row count, and every row is exactly
/// `stride` bytes.
#[derive(Debug, Clone, Copy)]
pub struct TableView<'data> {
    rows: &'data [u8],
    row_count: u32,
    stride: u32,
}

impl<'data> TableView<'data> {
    /// Builds a view over `rows` holding `row_count` fixed-width rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedTable`] when the section length is not an
    /// exact multiple of the row count, or when the count is zero while the
    /// section is non-empty.
    pub fn new(rows: &'data [u8], row_count: u32) -> Result<Self> {
        let section_len = rows.len() as u64;
        if row_count == 0 {
            if section_len != 0 {
                return Err(Error::MalformedTable {
                    section: Section::RowSection,
                    details: Cow::from("row count is zero but the row section is non-empty"),
                });
            }
            return Ok(Self {
                rows,
                row_count: 0,
                stride: 0,
            });
        }
        if section_len % u64::from(row_count) != 0 {
            return Err(Error::MalformedTable {
                section: Section::RowSection,
                details: Cow::from(format!(
                    "section length {section_len} is not divisible by row count {row_count}"
                )),
            });
        }
        let stride = u32::try_from(section_len / u64::from(row_count)).map_err(|_| {
            Error::MalformedTable {
                section: Section::RowSection,
                details: Cow::from("row stride exceeds u32 range"),
            }
        })?;
        Ok(Self {
            rows,
            row_count,
            stride,
        })
    }

    #[must_use]
    pub const fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Fixed byte width of every row.
    #[must_use]
    pub const fn stride(&self) -> u32 {
        self.stride
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Returns the raw bytes of row `index`, exactly `stride` of them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] for `index >= row_count`. This is a
    /// contract violation by the caller, not a data condition.
    pub fn row_bytes(&self, index: u32) -> Result<&'data [u8]> {
        if index >= self.row_count {
            return Err(Error::IndexOutOfRange {
                index: u64::from(index),
                count: u64::from(self.row_count),
            });
        }
        let start = index as usize * self.stride as usize;
        Ok(&self.rows[start..start + self.stride as usize])
    }

    /// Iterates the row slices in order.
    pub fn iter(&self) -> impl Iterator<Item = &'data [u8]> + '_ {
        self.rows.chunks_exact(self.stride.max(1) as usize)
    }

    /// View over the first `count` rows (all of them when `count` is larger).
    #[must_use]
    pub fn truncate(&self, count: u32) -> Self {
        let kept = count.min(self.row_count);
        Self {
            rows: &self.rows[..kept as usize * self.stride as usize],
            row_count: kept,
            stride: self.stride,
        }
    }
}
