use std::sync::Arc;

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::parser::cancel::DecodeTicket;
use crate::parser::decode::{DecodeContext, decode_column};
use crate::parser::heap::Heap;
use crate::parser::table::TableView;
use crate::schema::ValidatedHeaders;
use crate::value::Value;

/// One materialized row: values index-aligned with the validated header
/// names, which are shared across all rows of a decode.
#[derive(Debug, Clone)]
pub struct Row<'data> {
    names: Arc<[String]>,
    values: Vec<Value<'data>>,
}

impl<'data> Row<'data> {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value<'data>> {
        let index = self.names.iter().position(|n| n.as_str() == name)?;
        self.values.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value<'data>)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    #[must_use]
    pub fn values(&self) -> &[Value<'data>] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn into_owned(self) -> Row<'static> {
        Row {
            names: self.names,
            values: self.values.into_iter().map(Value::into_owned).collect(),
        }
    }
}

/// Order-insensitive equality on the name→value mapping: two rows are equal
/// when every name resolves to the same value, regardless of column order.
impl PartialEq for Row<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self
                .iter()
                .all(|(name, value)| other.get(name) == Some(value))
    }
}

/// Runs one column decode per header and transposes the results into
/// row-major records.
///
/// Column decoders share only immutable views, so they fan out across the
/// rayon pool when `parallel` is set; the transpose is the join point. The
/// transpose is a single linear pass pushing each column's values into
/// preallocated rows rather than a per-cell lookup, which is what keeps wide
/// tables with many rows interactive.
///
/// # Errors
///
/// [`Error::Superseded`] when `ticket` stops being current; results of a
/// superseded decode are never delivered, even when all columns finished.
pub fn materialize<'data>(
    view: &TableView<'data>,
    heap: &Heap<'data>,
    headers: &ValidatedHeaders,
    parallel: bool,
    ticket: Option<&DecodeTicket>,
) -> Result<Vec<Row<'data>>> {
    let ctx = DecodeContext {
        endianness: headers.endianness(),
        text_encoding: headers.text_encoding(),
        ticket,
    };

    let columns: Vec<Vec<Value<'data>>> = if parallel && headers.len() > 1 {
        headers
            .columns()
            .par_iter()
            .map(|column| decode_column(column, view, heap, &ctx))
            .collect::<Result<_>>()?
    } else {
        headers
            .columns()
            .iter()
            .map(|column| decode_column(column, view, heap, &ctx))
            .collect::<Result<_>>()?
    };

    if ticket.is_some_and(DecodeTicket::is_superseded) {
        return Err(Error::Superseded);
    }

    let row_count = view.row_count() as usize;
    let mut values: Vec<Vec<Value<'data>>> = (0..row_count)
        .map(|_| Vec::with_capacity(headers.len()))
        .collect();
    for column in columns {
        debug_assert_eq!(column.len(), row_count);
        for (row, value) in values.iter_mut().zip(column) {
            row.push(value);
        }
    }

    let names = Arc::clone(headers.names());
    Ok(values
        .into_iter()
        .map(|row_values| Row {
            names: Arc::clone(&names),
            values: row_values,
        })
        .collect())
}
