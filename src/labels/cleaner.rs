//! Accidents table cleaning

use super::lookup::{LabelMap, LookupTable};
use super::timestamp::parse_mixed_datetime;
use crate::config::CleanConfig;
use crate::decode::{parse_integer, CsvSource};
use crate::error::{Error, Result};
use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, StringArray, TimestampSecondArray};
use arrow::compute::filter_record_batch;
use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use arrow::row::{RowConverter, SortField};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Timestamp rendering in the cleaned CSV
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result of a cleaning run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanSummary {
    /// Rows in the source table
    pub rows_read: usize,
    /// Exact duplicates removed
    pub duplicates_dropped: usize,
    /// Rows in the cleaned table
    pub rows_written: usize,
    /// Columns in the cleaned table
    pub columns: usize,
    /// Cells replaced per field
    pub replaced: BTreeMap<String, usize>,
    /// Destination CSV
    pub output: PathBuf,
}

/// Run the full cleaning pass described by `config`
pub fn clean_accidents(config: &CleanConfig) -> Result<CleanSummary> {
    info!("Loading lookups: {}", config.lookups.display());
    let lookups = LookupTable::load(&config.lookups)?;

    info!("Loading accidents: {}", config.accidents.display());
    let table = CsvSource::new(&config.accidents, 65_536).read_all_text()?;
    let rows_read = table.num_rows();

    let (labelled, replaced) = apply_labels(&table, &lookups, &config.fields)?;
    let stamped = add_timestamp(&labelled, config)?;
    let (deduped, duplicates_dropped) = drop_duplicates(&stamped)?;

    log_table_info(&deduped);
    write_csv(&deduped, &config.output)?;
    info!("Saved cleaned data: {}", config.output.display());

    Ok(CleanSummary {
        rows_read,
        duplicates_dropped,
        rows_written: deduped.num_rows(),
        columns: deduped.num_columns(),
        replaced,
        output: config.output.clone(),
    })
}

/// Replace coded values in each field with their lookup labels
///
/// Cells that parse as an integer code present in the field's mapping are
/// replaced (a missing label makes the cell null); everything else is left
/// as it was. Returns the relabelled table and the replacement count per
/// field.
pub fn apply_labels(
    table: &RecordBatch,
    lookups: &LookupTable,
    fields: &[String],
) -> Result<(RecordBatch, BTreeMap<String, usize>)> {
    let schema = table.schema();
    let mut columns: Vec<ArrayRef> = table.columns().to_vec();
    let mut replaced = BTreeMap::new();

    for field in fields {
        let idx = schema
            .index_of(field)
            .map_err(|_| Error::column_not_found(field.as_str()))?;
        let labels = lookups.labels_for(field);
        let (column, count) = relabel_column(&columns[idx], field, &labels)?;
        columns[idx] = column;
        replaced.insert(field.clone(), count);
    }

    Ok((RecordBatch::try_new(schema, columns)?, replaced))
}

fn relabel_column(
    column: &ArrayRef,
    field: &str,
    labels: &LabelMap,
) -> Result<(ArrayRef, usize)> {
    let values = column.as_string_opt::<i32>().ok_or_else(|| {
        Error::schema_mismatch(format!("field '{field}' is not a text column"))
    })?;

    let mut count = 0usize;
    let relabelled: StringArray = values
        .iter()
        .map(|value| {
            let value = value?;
            match parse_integer(value).and_then(|code| labels.get(&code)) {
                Some(label) => {
                    count += 1;
                    label.clone()
                }
                None => Some(value.to_string()),
            }
        })
        .collect();

    Ok((Arc::new(relabelled), count))
}

/// Derive the timestamp column from the date and time columns
///
/// A null date or time gives a null timestamp. An existing column with the
/// timestamp name is replaced in place.
pub fn add_timestamp(table: &RecordBatch, config: &CleanConfig) -> Result<RecordBatch> {
    let dates = text_column(table, &config.date_column)?;
    let times = text_column(table, &config.time_column)?;

    let mut stamps = Vec::with_capacity(table.num_rows());
    for (row, (date, time)) in dates.iter().zip(times.iter()).enumerate() {
        let (Some(date), Some(time)) = (date, time) else {
            stamps.push(None);
            continue;
        };
        let combined = format!("{} {}", date.trim(), time.trim());
        let parsed = parse_mixed_datetime(&combined, config.day_first).ok_or_else(|| {
            Error::TimestampParse {
                row: row + 1,
                value: combined.clone(),
            }
        })?;
        stamps.push(Some(parsed.and_utc().timestamp()));
    }
    let stamps: ArrayRef = Arc::new(TimestampSecondArray::from(stamps));

    let field = Field::new(
        &config.timestamp_column,
        DataType::Timestamp(TimeUnit::Second, None),
        true,
    );
    let schema = table.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let mut columns = table.columns().to_vec();

    match schema.index_of(&config.timestamp_column) {
        Ok(idx) => {
            fields[idx] = field;
            columns[idx] = stamps;
        }
        Err(_) => {
            fields.push(field);
            columns.push(stamps);
        }
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

fn text_column<'a>(table: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    table
        .column_by_name(name)
        .ok_or_else(|| Error::column_not_found(name))?
        .as_string_opt::<i32>()
        .ok_or_else(|| Error::schema_mismatch(format!("column '{name}' is not a text column")))
}

/// Remove exact duplicate rows, keeping first occurrences
pub fn drop_duplicates(table: &RecordBatch) -> Result<(RecordBatch, usize)> {
    let sort_fields: Vec<SortField> = table
        .schema()
        .fields()
        .iter()
        .map(|f| SortField::new(f.data_type().clone()))
        .collect();
    let converter = RowConverter::new(sort_fields)?;
    let rows = converter.convert_columns(table.columns())?;

    let mut seen = HashSet::with_capacity(rows.num_rows());
    let keep: BooleanArray = rows.iter().map(|row| Some(seen.insert(row))).collect();

    let deduped = filter_record_batch(table, &keep)?;
    let dropped = table.num_rows() - deduped.num_rows();
    Ok((deduped, dropped))
}

/// Write a table as CSV with a header row
pub fn write_csv(table: &RecordBatch, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new()
        .with_header(true)
        .with_timestamp_format(TIMESTAMP_FORMAT.to_string())
        .build(file);
    writer.write(table)?;
    Ok(())
}

fn log_table_info(table: &RecordBatch) {
    info!("{} rows, {} columns", table.num_rows(), table.num_columns());
    for (field, column) in table.schema().fields().iter().zip(table.columns()) {
        info!(
            "  {}: {} non-null {}",
            field.name(),
            column.len() - column.null_count(),
            field.data_type()
        );
    }
}
