use std::borrow::Cow;
use std::io::Write;

use csv::{ByteRecord, Writer, WriterBuilder};
use itoa::Buffer as ItoaBuffer;
use ryu::Buffer as RyuBuffer;

use crate::error::{Error, Result};
use crate::parser::Row;
use crate::sinks::{RowSink, SinkContext};
use crate::value::Value;

/// Marker written for cells that decoded to an error sentinel.
const ERROR_MARKER: &str = "#ERR";

/// Writes decoded rows into a delimited text file (CSV/TSV).
pub struct CsvSink<W: Write> {
    output: Option<W>,
    writer: Option<Writer<W>>,
    delimiter: u8,
    write_headers: bool,
    record: ByteRecord,
    scratch: String,
}

impl<W: Write> CsvSink<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            output: Some(writer),
            writer: None,
            delimiter: b',',
            write_headers: true,
            record: ByteRecord::new(),
            scratch: String::new(),
        }
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub const fn with_headers(mut self, headers: bool) -> Self {
        self.write_headers = headers;
        self
    }

    fn build_writer(&mut self) -> Result<()> {
        let output = self.output.take().ok_or_else(|| Error::Sink {
            details: Cow::from("CSV sink output already taken"),
        })?;
        let mut builder = WriterBuilder::new();
        builder.delimiter(self.delimiter);
        self.writer = Some(builder.from_writer(output));
        Ok(())
    }

    fn writer_mut(&mut self) -> Result<&mut Writer<W>> {
        self.writer.as_mut().ok_or_else(|| Error::Sink {
            details: Cow::from("CSV sink used before begin"),
        })
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn begin(&mut self, context: SinkContext<'_>) -> Result<()> {
        self.build_writer()?;
        if self.write_headers {
            let mut record = std::mem::take(&mut self.record);
            record.clear();
            for name in context.headers.names().iter() {
                record.push_field(name.as_bytes());
            }
            let result = self.writer_mut()?.write_byte_record(&record);
            self.record = record;
            result?;
        }
        Ok(())
    }

    fn write_row(&mut self, row: &Row<'_>) -> Result<()> {
        let mut record = std::mem::take(&mut self.record);
        record.clear();
        for value in row.values() {
            self.scratch.clear();
            render_value(value, &mut self.scratch);
            record.push_field(self.scratch.as_bytes());
        }
        let result = self.writer_mut()?.write_byte_record(&record);
        self.record = record;
        result?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

/// Renders one value into a CSV field. Arrays come out bracketed with
/// `;`-separated elements so the cell survives the record delimiter.
fn render_value(value: &Value<'_>, out: &mut String) {
    match value {
        Value::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
        Value::Int32(v) => out.push_str(ItoaBuffer::new().format(*v)),
        Value::Int64(v) => out.push_str(ItoaBuffer::new().format(*v)),
        Value::UInt64(v) => out.push_str(ItoaBuffer::new().format(*v)),
        Value::Float(v) => {
            if v.is_finite() {
                out.push_str(RyuBuffer::new().format(*v));
            } else {
                out.push_str(&v.to_string());
            }
        }
        Value::Str(text) => out.push_str(text),
        Value::ForeignRow(index) => {
            out.push('<');
            out.push_str(ItoaBuffer::new().format(*index));
            out.push('>');
        }
        Value::Null => {}
        Value::Array(items) => {
            out.push('[');
            for (position, item) in items.iter().enumerate() {
                if position > 0 {
                    out.push(';');
                }
                render_value(item, out);
            }
            out.push(']');
        }
        Value::Error(_) => out.push_str(ERROR_MARKER),
    }
}
