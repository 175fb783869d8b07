#![allow(clippy::pedantic)]
mod common;

use std::borrow::Cow;

use common::{DatBuilder, header, ref_field, schema};
use datview::parser::DecodeCoordinator;
use datview::schema::ColumnType;
use datview::{DecodeOptions, Error, Value, decode_file};

fn int_row(a: i32, b: i32) -> Vec<u8> {
    let mut row = Vec::new();
    row.extend(a.to_le_bytes());
    row.extend(b.to_le_bytes());
    row
}

fn two_int_table() -> Vec<u8> {
    let mut builder = DatBuilder::new();
    builder
        .row(int_row(1, 10))
        .row(int_row(2, 20))
        .row(int_row(3, 30));
    builder.build()
}

#[test]
fn decodes_two_int_columns() {
    let bytes = two_int_table();
    let s = schema(
        "t",
        vec![
            header(Some("A"), 0, ColumnType::I32),
            header(Some("B"), 4, ColumnType::I32),
        ],
    );
    let table = decode_file(&bytes, &s, &DecodeOptions::new()).unwrap();
    assert_eq!(table.rows.len(), 3);
    for (row, (a, b)) in table.rows.iter().zip([(1, 10), (2, 20), (3, 30)]) {
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("A"), Some(&Value::Int32(a)));
        assert_eq!(row.get("B"), Some(&Value::Int32(b)));
    }
}

#[test]
fn header_beyond_stride_fails_whole_file() {
    let bytes = two_int_table();
    let s = schema(
        "t",
        vec![
            header(Some("A"), 0, ColumnType::I32),
            header(Some("B"), 8, ColumnType::I32),
        ],
    );
    match decode_file(&bytes, &s, &DecodeOptions::new()).unwrap_err() {
        Error::SchemaMismatch { schema, .. } => assert_eq!(schema, "t"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn partial_opt_in_decodes_the_fitting_headers() {
    let bytes = two_int_table();
    let s = schema(
        "t",
        vec![
            header(Some("A"), 0, ColumnType::I32),
            header(Some("B"), 8, ColumnType::I32),
        ],
    );
    let table = decode_file(&bytes, &s, &DecodeOptions::new().with_partial_headers()).unwrap();
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[0].len(), 1);
    assert_eq!(table.rows[0].get("A"), Some(&Value::Int32(1)));
    assert_eq!(table.rows[0].get("B"), None);
}

#[test]
fn bad_heap_reference_is_isolated_to_its_cell() {
    let mut builder = DatBuilder::new();
    let (base, length) = builder.heap_string("ok");
    let heap_len = builder.heap_len();
    let mut good = ref_field(base, length);
    good.extend(7i32.to_le_bytes());
    // Reference ending exactly one byte past the heap end.
    let mut bad = ref_field(heap_len - 1, 2);
    bad.extend(9i32.to_le_bytes());
    builder.row(good).row(bad);
    let bytes = builder.build();

    let s = schema(
        "t",
        vec![
            header(Some("Name"), 0, ColumnType::String),
            header(Some("Level"), 8, ColumnType::I32),
        ],
    );
    let table = decode_file(&bytes, &s, &DecodeOptions::new()).unwrap();
    assert_eq!(table.rows[0].get("Name"), Some(&Value::Str(Cow::from("ok"))));
    assert_eq!(table.rows[0].get("Level"), Some(&Value::Int32(7)));
    assert!(table.rows[1].get("Name").unwrap().is_error());
    // The corrupt cell does not disturb its row siblings.
    assert_eq!(table.rows[1].get("Level"), Some(&Value::Int32(9)));
}

#[test]
fn heap_reference_to_exact_end_is_valid() {
    let mut builder = DatBuilder::new();
    let (base, length) = builder.heap_string("xy");
    assert_eq!(base + length, builder.heap_len());
    builder.row(ref_field(base, length));
    let bytes = builder.build();
    let s = schema("t", vec![header(Some("S"), 0, ColumnType::String)]);
    let table = decode_file(&bytes, &s, &DecodeOptions::new()).unwrap();
    assert_eq!(table.rows[0].get("S"), Some(&Value::Str(Cow::from("xy"))));
}

#[test]
fn unnamed_headers_get_stable_placeholders() {
    let bytes = two_int_table();
    let s = schema(
        "t",
        vec![
            header(None, 0, ColumnType::I32),
            header(None, 4, ColumnType::I32),
        ],
    );
    let first = decode_file(&bytes, &s, &DecodeOptions::new()).unwrap();
    assert_eq!(first.rows[0].get("Unnamed 0"), Some(&Value::Int32(1)));
    assert_eq!(first.rows[0].get("Unnamed 1"), Some(&Value::Int32(10)));

    let second = decode_file(&bytes, &s, &DecodeOptions::new()).unwrap();
    assert_eq!(first.rows, second.rows);
}

#[test]
fn decode_is_deterministic() {
    let mut builder = DatBuilder::new();
    let (base, length) = builder.heap_string("alpha");
    let mut row = ref_field(base, length);
    row.extend(1.25f64.to_le_bytes());
    builder.row(row);
    let bytes = builder.build();
    let s = schema(
        "t",
        vec![
            header(Some("S"), 0, ColumnType::String),
            header(Some("F"), 8, ColumnType::F64),
        ],
    );
    let once = decode_file(&bytes, &s, &DecodeOptions::new()).unwrap();
    let twice = decode_file(&bytes, &s, &DecodeOptions::new()).unwrap();
    assert_eq!(once.rows, twice.rows);
}

#[test]
fn header_order_does_not_change_rows() {
    let bytes = two_int_table();
    let forward = schema(
        "t",
        vec![
            header(Some("A"), 0, ColumnType::I32),
            header(Some("B"), 4, ColumnType::I32),
        ],
    );
    let mut reversed = forward.clone();
    reversed.headers.reverse();
    let a = decode_file(&bytes, &forward, &DecodeOptions::new()).unwrap();
    let b = decode_file(&bytes, &reversed, &DecodeOptions::new()).unwrap();
    assert_eq!(a.rows, b.rows);
}

#[test]
fn mixed_reference_row_decodes() {
    let mut builder = DatBuilder::new();
    let (base, length) = builder.heap_string("boots");
    let run = builder.heap_bytes(&[5u8, 0, 0, 0, 6, 0, 0, 0]);
    let mut row = Vec::new();
    row.extend(ref_field(base, length)); // string at 0
    row.extend(ref_field(run, 2)); // array of i32 at 8
    row.extend(0xFEFE_FEFEu32.to_le_bytes()); // null foreign row at 16
    row.extend(3u32.to_le_bytes()); // foreign row at 20
    row.push(1); // bool at 24
    builder.row(row);
    let bytes = builder.build();

    let s = schema(
        "t",
        vec![
            header(Some("Name"), 0, ColumnType::String),
            header(
                Some("Stats"),
                8,
                ColumnType::Array {
                    element: Box::new(ColumnType::I32),
                },
            ),
            header(Some("Parent"), 16, ColumnType::ForeignRow),
            header(Some("Kind"), 20, ColumnType::ForeignRow),
            header(Some("Enabled"), 24, ColumnType::Bool),
        ],
    );
    let table = decode_file(&bytes, &s, &DecodeOptions::new()).unwrap();
    let row = &table.rows[0];
    assert_eq!(row.get("Name"), Some(&Value::Str(Cow::from("boots"))));
    assert_eq!(
        row.get("Stats"),
        Some(&Value::Array(vec![Value::Int32(5), Value::Int32(6)]))
    );
    assert_eq!(row.get("Parent"), Some(&Value::Null));
    assert_eq!(row.get("Kind"), Some(&Value::ForeignRow(3)));
    assert_eq!(row.get("Enabled"), Some(&Value::Bool(true)));
}

#[test]
fn projection_keeps_schema_order() {
    let bytes = two_int_table();
    let s = schema(
        "t",
        vec![
            header(Some("A"), 0, ColumnType::I32),
            header(Some("B"), 4, ColumnType::I32),
        ],
    );
    let options = DecodeOptions::new().with_columns(["B"]);
    let table = decode_file(&bytes, &s, &options).unwrap();
    assert_eq!(table.headers.names().len(), 1);
    assert_eq!(table.rows[0].get("B"), Some(&Value::Int32(10)));
    assert_eq!(table.rows[0].get("A"), None);

    let unknown = DecodeOptions::new().with_columns(["C"]);
    assert!(matches!(
        decode_file(&bytes, &s, &unknown),
        Err(Error::InvalidSchema { .. })
    ));
}

#[test]
fn max_rows_truncates() {
    let bytes = two_int_table();
    let s = schema(
        "t",
        vec![
            header(Some("A"), 0, ColumnType::I32),
            header(Some("B"), 4, ColumnType::I32),
        ],
    );
    let table = decode_file(&bytes, &s, &DecodeOptions::new().with_max_rows(2)).unwrap();
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[1].get("A"), Some(&Value::Int32(2)));
}

#[test]
fn empty_table_decodes_to_zero_rows() {
    let builder = DatBuilder::new();
    let bytes = builder.build();
    let s = schema("t", vec![header(Some("A"), 0, ColumnType::I32)]);
    let table = decode_file(&bytes, &s, &DecodeOptions::new()).unwrap();
    assert!(table.rows.is_empty());
    assert_eq!(table.headers.names().len(), 1);
}

#[test]
fn parallel_decode_matches_serial() {
    let mut builder = DatBuilder::new();
    for index in 0..100i32 {
        let (base, length) = builder.heap_string(&format!("row {index}"));
        let mut row = ref_field(base, length);
        row.extend(index.to_le_bytes());
        builder.row(row);
    }
    let bytes = builder.build();
    let s = schema(
        "t",
        vec![
            header(Some("Label"), 0, ColumnType::String),
            header(Some("N"), 8, ColumnType::I32),
        ],
    );
    let serial = decode_file(&bytes, &s, &DecodeOptions::new()).unwrap();
    let parallel =
        decode_file(&bytes, &s, &DecodeOptions::new().with_parallel_columns()).unwrap();
    assert_eq!(serial.rows, parallel.rows);
}

#[test]
fn superseded_request_delivers_nothing() {
    let bytes = two_int_table();
    let s = schema("t", vec![header(Some("A"), 0, ColumnType::I32)]);
    let coordinator = DecodeCoordinator::new();
    let ticket = coordinator.begin();
    let _newer = coordinator.begin();
    assert!(matches!(
        decode_file(&bytes, &s, &DecodeOptions::new().with_ticket(ticket)),
        Err(Error::Superseded)
    ));
}
