use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::parser::byteorder::{
    read_f32, read_f64, read_i16, read_i32, read_i64, read_u16, read_u32, read_u64,
};
use crate::parser::cancel::DecodeTicket;
use crate::parser::heap::{Heap, HeapRef};
use crate::parser::table::TableView;
use crate::schema::{BoundColumn, ColumnType, Endianness, TextEncoding};
use crate::value::Value;

/// Row index carrying the null sentinel for a foreign-key field.
pub const NULL_ROW: u32 = 0xFEFE_FEFE;

/// Poll the supersession ticket this often within one column.
const CANCEL_POLL_ROWS: u32 = 4096;

/// Shared read-only inputs for one decode invocation.
#[derive(Clone, Copy)]
pub struct DecodeContext<'req> {
    pub endianness: Endianness,
    pub text_encoding: TextEncoding,
    pub ticket: Option<&'req DecodeTicket>,
}

/// Decodes one column across all rows.
///
/// Pure with respect to its inputs: identical (header, bytes) always yields
/// an identical column. Per-row failures become [`Value::Error`] sentinels;
/// a single corrupt row never blocks the rest of the table.
///
/// # Errors
///
/// Only [`Error::Superseded`] when the request's ticket is no longer
/// current; data problems never error at column level.
pub fn decode_column<'data>(
    column: &BoundColumn,
    view: &TableView<'data>,
    heap: &Heap<'data>,
    ctx: &DecodeContext<'_>,
) -> Result<Vec<Value<'data>>> {
    let mut values = Vec::with_capacity(view.row_count() as usize);
    for (index, row) in view.iter().enumerate() {
        if index as u32 % CANCEL_POLL_ROWS == 0
            && ctx.ticket.is_some_and(DecodeTicket::is_superseded)
        {
            return Err(Error::Superseded);
        }
        values.push(decode_field(column, row, heap, ctx));
    }
    Ok(values)
}

/// Decodes the field described by `column` out of one row's bytes.
///
/// The caller guarantees `offset + width <= row.len()` (the matcher enforced
/// it against the stride).
pub fn decode_field<'data>(
    column: &BoundColumn,
    row: &[u8],
    heap: &Heap<'data>,
    ctx: &DecodeContext<'_>,
) -> Value<'data> {
    let field = &row[column.offset as usize..(column.offset + column.ty.width()) as usize];
    match &column.ty {
        ColumnType::String => {
            let reference = read_ref(field, ctx.endianness);
            match heap.resolve_string(reference, ctx.text_encoding) {
                Ok(text) => Value::Str(Cow::Owned(text.into_owned())),
                Err(err) => Value::Error(err),
            }
        }
        ColumnType::Array { element } => {
            let mut reference = read_ref(field, ctx.endianness);
            if let Some(fixed) = column.length {
                reference.count = fixed;
            }
            decode_array(element, reference, heap, ctx)
        }
        scalar => decode_scalar(scalar, field, ctx.endianness),
    }
}

fn decode_array<'data>(
    element: &ColumnType,
    reference: HeapRef,
    heap: &Heap<'data>,
    ctx: &DecodeContext<'_>,
) -> Value<'data> {
    let width = element.width();
    let run = match heap.resolve(reference, width) {
        Ok(run) => run,
        Err(err) => return Value::Error(err),
    };
    let mut items = Vec::with_capacity(reference.count as usize);
    for chunk in run.chunks_exact(width as usize) {
        let item = match element {
            ColumnType::String => {
                let nested = read_ref(chunk, ctx.endianness);
                match heap.resolve_string(nested, ctx.text_encoding) {
                    Ok(text) => Value::Str(Cow::Owned(text.into_owned())),
                    Err(err) => Value::Error(err),
                }
            }
            scalar => decode_scalar(scalar, chunk, ctx.endianness),
        };
        items.push(item);
    }
    Value::Array(items)
}

fn decode_scalar<'data>(ty: &ColumnType, field: &[u8], endian: Endianness) -> Value<'data> {
    match ty {
        ColumnType::Bool => Value::Bool(field[0] != 0),
        ColumnType::I16 => Value::Int32(i32::from(read_i16(endian, field))),
        ColumnType::U16 => Value::Int32(i32::from(read_u16(endian, field))),
        ColumnType::I32 => Value::Int32(read_i32(endian, field)),
        ColumnType::U32 => {
            let raw = read_u32(endian, field);
            i32::try_from(raw).map_or_else(|_| Value::Int64(i64::from(raw)), Value::Int32)
        }
        ColumnType::I64 => Value::Int64(read_i64(endian, field)),
        ColumnType::U64 => {
            let raw = read_u64(endian, field);
            i64::try_from(raw).map_or(Value::UInt64(raw), Value::Int64)
        }
        ColumnType::F32 => Value::Float(f64::from(read_f32(endian, field))),
        ColumnType::F64 => Value::Float(read_f64(endian, field)),
        ColumnType::ForeignRow => {
            let index = read_u32(endian, field);
            if index == NULL_ROW {
                Value::Null
            } else {
                Value::ForeignRow(index)
            }
        }
        ColumnType::String | ColumnType::Array { .. } => {
            unreachable!("reference types are decoded through the heap")
        }
    }
}

fn read_ref(field: &[u8], endian: Endianness) -> HeapRef {
    HeapRef {
        base: read_u32(endian, field),
        count: read_u32(endian, &field[4..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::cancel::DecodeCoordinator;

    const LE: DecodeContext<'static> = DecodeContext {
        endianness: Endianness::Little,
        text_encoding: TextEncoding::Utf16Le,
        ticket: None,
    };

    fn column(ty: ColumnType) -> BoundColumn {
        BoundColumn {
            name: "c".into(),
            offset: 0,
            ty,
            length: None,
        }
    }

    #[test]
    fn scalar_widths_and_tags() {
        let heap = Heap::new(&[]);
        assert_eq!(
            decode_field(&column(ColumnType::Bool), &[2], &heap, &LE),
            Value::Bool(true)
        );
        assert_eq!(
            decode_field(&column(ColumnType::I16), &(-3i16).to_le_bytes(), &heap, &LE),
            Value::Int32(-3)
        );
        assert_eq!(
            decode_field(&column(ColumnType::U32), &u32::MAX.to_le_bytes(), &heap, &LE),
            Value::Int64(i64::from(u32::MAX))
        );
        assert_eq!(
            decode_field(&column(ColumnType::U64), &u64::MAX.to_le_bytes(), &heap, &LE),
            Value::UInt64(u64::MAX)
        );
        assert_eq!(
            decode_field(&column(ColumnType::F32), &2.5f32.to_le_bytes(), &heap, &LE),
            Value::Float(2.5)
        );
    }

    #[test]
    fn big_endian_scalars() {
        let ctx = DecodeContext {
            endianness: Endianness::Big,
            ..LE
        };
        let heap = Heap::new(&[]);
        assert_eq!(
            decode_field(&column(ColumnType::I32), &0x0102_0304i32.to_be_bytes(), &heap, &ctx),
            Value::Int32(0x0102_0304)
        );
    }

    #[test]
    fn null_foreign_row() {
        let heap = Heap::new(&[]);
        assert_eq!(
            decode_field(
                &column(ColumnType::ForeignRow),
                &NULL_ROW.to_le_bytes(),
                &heap,
                &LE
            ),
            Value::Null
        );
        assert_eq!(
            decode_field(&column(ColumnType::ForeignRow), &7u32.to_le_bytes(), &heap, &LE),
            Value::ForeignRow(7)
        );
    }

    #[test]
    fn array_of_i32() {
        let mut heap_bytes = vec![0xBBu8; 8];
        for v in [10i32, 20, 30] {
            heap_bytes.extend(v.to_le_bytes());
        }
        let heap = Heap::new(&heap_bytes);
        let mut field = Vec::new();
        field.extend(8u32.to_le_bytes());
        field.extend(3u32.to_le_bytes());
        let value = decode_field(
            &column(ColumnType::Array {
                element: Box::new(ColumnType::I32),
            }),
            &field,
            &heap,
            &LE,
        );
        assert_eq!(
            value,
            Value::Array(vec![Value::Int32(10), Value::Int32(20), Value::Int32(30)])
        );
    }

    #[test]
    fn fixed_length_overrides_row_count_field() {
        let mut heap_bytes = vec![0xBBu8; 8];
        for v in [1i32, 2, 3, 4] {
            heap_bytes.extend(v.to_le_bytes());
        }
        let heap = Heap::new(&heap_bytes);
        let mut field = Vec::new();
        field.extend(8u32.to_le_bytes());
        field.extend(999u32.to_le_bytes()); // padding once a fixed length is declared
        let col = BoundColumn {
            length: Some(2),
            ..column(ColumnType::Array {
                element: Box::new(ColumnType::I32),
            })
        };
        assert_eq!(
            decode_field(&col, &field, &heap, &LE),
            Value::Array(vec![Value::Int32(1), Value::Int32(2)])
        );
    }

    #[test]
    fn out_of_bounds_reference_is_a_cell_error() {
        let heap = Heap::new(&[0xBB; 8]);
        let mut field = Vec::new();
        field.extend(8u32.to_le_bytes());
        field.extend(1u32.to_le_bytes());
        let value = decode_field(&column(ColumnType::String), &field, &heap, &LE);
        assert!(value.is_error());
    }

    #[test]
    fn superseded_ticket_aborts_column() {
        let coordinator = DecodeCoordinator::new();
        let ticket = coordinator.begin();
        let _newer = coordinator.begin();
        let ctx = DecodeContext {
            ticket: Some(&ticket),
            ..LE
        };
        let rows = [0u8; 8];
        let view = TableView::new(&rows, 2).unwrap();
        let heap = Heap::new(&[]);
        assert!(matches!(
            decode_column(&column(ColumnType::I32), &view, &heap, &ctx),
            Err(Error::Superseded)
        ));
    }
}
