use std::borrow::Cow;
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::logger::log_warn;
use crate::schema::{BoundColumn, ColumnType, TableSchema, ValidatedHeaders};

/// Validates a candidate header set against the observed row stride.
///
/// Every header must satisfy `offset + width <= stride`; a header ending
/// exactly at the stride boundary is valid. By default any misfit fails the
/// whole set with [`Error::SchemaMismatch`] (schema drift between the
/// external definition and the actual layout). With `allow_partial` the
/// offending headers are dropped instead, each logged, and the remaining
/// headers decode; an empty survivor set is still a mismatch.
///
/// Headers without a name receive the placeholder `Unnamed {i}` from their
/// position in the schema's header list; colliding names are suffixed
/// (`_2`, `_3`, ...) in list order. Both are deterministic, so row keys are
/// stable across repeated decodes of the same schema set.
///
/// # Errors
///
/// [`Error::InvalidSchema`] for header sets that are wrong independent of
/// any file (duplicate offsets, arrays of arrays); [`Error::SchemaMismatch`]
/// when the set does not fit the observed stride.
pub fn match_headers(
    schema: &TableSchema,
    stride: u32,
    allow_partial: bool,
) -> Result<ValidatedHeaders> {
    let mut seen_offsets = HashSet::with_capacity(schema.headers.len());
    for header in &schema.headers {
        if !seen_offsets.insert(header.offset) {
            return Err(Error::InvalidSchema {
                details: format!(
                    "schema '{}' declares offset {} twice",
                    schema.name, header.offset
                )
                .into(),
            });
        }
        if let ColumnType::Array { element } = &header.ty
            && matches!(element.as_ref(), ColumnType::Array { .. })
        {
            return Err(Error::InvalidSchema {
                details: format!(
                    "schema '{}' declares a nested array at offset {}",
                    schema.name, header.offset
                )
                .into(),
            });
        }
    }

    let mut columns = Vec::with_capacity(schema.headers.len());
    for (position, header) in schema.headers.iter().enumerate() {
        let width = header.ty.width();
        let end = u64::from(header.offset) + u64::from(width);
        if end > u64::from(stride) {
            if allow_partial {
                log_warn(&format!(
                    "schema '{}': dropping header at offset {} (width {}) beyond stride {}",
                    schema.name, header.offset, width, stride
                ));
                continue;
            }
            return Err(Error::SchemaMismatch {
                schema: Cow::Owned(schema.name.clone()),
                details: Cow::Owned(format!(
                    "header at offset {} (width {}) exceeds row stride {}",
                    header.offset, width, stride
                )),
            });
        }
        let name = header
            .name
            .clone()
            .unwrap_or_else(|| format!("Unnamed {position}"));
        columns.push(BoundColumn {
            name,
            offset: header.offset,
            ty: header.ty.clone(),
            length: header.length,
        });
    }

    if columns.is_empty() {
        return Err(Error::SchemaMismatch {
            schema: Cow::Owned(schema.name.clone()),
            details: Cow::from("no header fits the observed stride"),
        });
    }

    disambiguate_names(&mut columns);
    Ok(ValidatedHeaders::new(
        schema.name.clone(),
        columns,
        stride,
        schema.endianness,
        schema.text_encoding,
    ))
}

fn disambiguate_names(columns: &mut [BoundColumn]) {
    let mut taken: HashSet<String> = HashSet::with_capacity(columns.len());
    for column in columns.iter_mut() {
        if taken.insert(column.name.clone()) {
            continue;
        }
        let mut attempt = 2usize;
        loop {
            let candidate = format!("{}_{attempt}", column.name);
            if taken.insert(candidate.clone()) {
                column.name = candidate;
                break;
            }
            attempt += 1;
        }
    }
}
