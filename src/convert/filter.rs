//! Row-level year filtering

use crate::config::YearFilter;
use crate::decode::parse_float;
use crate::error::{Error, Result};
use arrow::array::{Array, AsArray, BooleanArray};
use arrow::compute::filter_record_batch;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;

/// Keep rows whose year lies inside the inclusive range
///
/// Year values that do not parse as numbers are treated as missing and never
/// match. Returns the kept rows and how many were dropped.
pub fn filter_years(
    batch: &RecordBatch,
    column: &str,
    filter: &YearFilter,
) -> Result<(RecordBatch, usize)> {
    let idx = batch
        .schema()
        .index_of(column)
        .map_err(|_| Error::column_not_found(column))?;
    let years = batch.column(idx);

    let mask: BooleanArray = match years.data_type() {
        DataType::Utf8 => years
            .as_string::<i32>()
            .iter()
            .map(|v| Some(v.and_then(parse_float).is_some_and(|y| filter.contains(y))))
            .collect(),
        DataType::Int64 => years
            .as_primitive::<Int64Type>()
            .iter()
            .map(|v| Some(v.is_some_and(|y| filter.contains(y as f64))))
            .collect(),
        DataType::Float64 => years
            .as_primitive::<Float64Type>()
            .iter()
            .map(|v| Some(v.is_some_and(|y| filter.contains(y))))
            .collect(),
        other => {
            return Err(Error::schema_mismatch(format!(
                "year column '{column}' has unsupported type {other}"
            )))
        }
    };

    let kept = filter_record_batch(batch, &mask)?;
    let dropped = batch.num_rows() - kept.num_rows();
    Ok((kept, dropped))
}
