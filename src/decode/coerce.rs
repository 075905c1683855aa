//! Text to master-schema type coercion
//!
//! Malformed numbers never fail a batch: they become nulls.

use super::schema::{ColumnKind, MasterSchema};
use crate::error::{Error, Result};
use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Parse a numeric cell as a float
///
/// Surrounding whitespace is ignored. Empty or non-numeric text gives `None`.
pub fn parse_float(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Parse a numeric cell as an integer
///
/// Integral floats such as `2015.0` or `1e3` are accepted; fractional,
/// non-finite or out-of-range values give `None`.
pub fn parse_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }

    let f = parse_float(trimmed)?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Convert a text batch to the master schema
///
/// Columns are selected by name in master-schema order. A master column
/// missing from the batch, or a non-text column whose type differs from the
/// master type, is a schema mismatch.
pub fn coerce_batch(batch: &RecordBatch, schema: &MasterSchema) -> Result<RecordBatch> {
    let source = batch.schema();
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.len());

    for (name, kind) in schema.columns() {
        let idx = source.index_of(name).map_err(|_| {
            Error::schema_mismatch(format!("column '{name}' missing from batch"))
        })?;
        columns.push(coerce_column(batch.column(idx), name, kind)?);
    }

    Ok(RecordBatch::try_new(schema.schema(), columns)?)
}

fn coerce_column(column: &ArrayRef, name: &str, kind: ColumnKind) -> Result<ArrayRef> {
    let target = kind.data_type();
    if column.data_type() == &target {
        return Ok(Arc::clone(column));
    }

    let text = match column.data_type() {
        DataType::Utf8 => column.as_string::<i32>(),
        other => {
            return Err(Error::schema_mismatch(format!(
                "column '{name}' is {other}, expected {target}"
            )))
        }
    };

    let coerced: ArrayRef = match kind {
        ColumnKind::Integer => Arc::new(
            text.iter()
                .map(|v| v.and_then(parse_integer))
                .collect::<Int64Array>(),
        ),
        ColumnKind::Float => Arc::new(
            text.iter()
                .map(|v| v.and_then(parse_float))
                .collect::<Float64Array>(),
        ),
        // Utf8 already matched above
        ColumnKind::Text => Arc::clone(column),
    };

    debug_assert_eq!(coerced.len(), column.len());
    Ok(coerced)
}
