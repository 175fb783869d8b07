use std::borrow::Cow;

use encoding_rs::UTF_16LE;
use simdutf8::basic;

use crate::schema::TextEncoding;
use crate::value::CellError;

/// Decodes a heap byte run as text per the schema-declared encoding.
///
/// The byte length comes from the row field, so for UTF-16 an odd length is
/// already a malformed reference. Failures are per-cell: the caller stores
/// the returned [`CellError`] as a sentinel and keeps decoding.
pub fn decode_text(bytes: &[u8], encoding: TextEncoding) -> Result<Cow<'_, str>, CellError> {
    match encoding {
        TextEncoding::Utf8 => decode_utf8(bytes),
        TextEncoding::Utf16Le => decode_utf16le(bytes),
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<Cow<'_, str>, CellError> {
    if bytes.is_empty() {
        return Ok(Cow::Borrowed(""));
    }
    basic::from_utf8(bytes)
        .map(Cow::Borrowed)
        .map_err(|_| CellError::Encoding {
            details: Cow::from("invalid UTF-8 in heap string"),
        })
}

fn decode_utf16le(bytes: &[u8]) -> Result<Cow<'_, str>, CellError> {
    if bytes.is_empty() {
        return Ok(Cow::Borrowed(""));
    }
    if bytes.len() % 2 != 0 {
        return Err(CellError::Encoding {
            details: Cow::from("odd byte length for UTF-16 string"),
        });
    }
    let (decoded, had_errors) = UTF_16LE.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(CellError::Encoding {
            details: Cow::from("invalid UTF-16 code units in heap string"),
        });
    }
    Ok(Cow::Owned(decoded.into_owned()))
}
