//! Road-safety lookup table
//!
//! The lookup CSV has a `field name` column, and its third and fourth
//! columns hold the code and the label for that code.

use crate::decode::{parse_integer, CsvSource};
use crate::error::{Error, Result};
use arrow::array::AsArray;
use arrow::record_batch::RecordBatch;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Column holding the coded field name
pub const FIELD_NAME_COLUMN: &str = "field name";

/// Code to label mapping for one field; `None` is a missing label
pub type LabelMap = BTreeMap<i64, Option<String>>;

#[derive(Debug, Clone, PartialEq)]
struct LookupRow {
    field: String,
    code: i64,
    label: Option<String>,
}

/// Parsed lookup table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupTable {
    rows: Vec<LookupRow>,
}

impl LookupTable {
    /// Load a lookup table from CSV
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let batch = CsvSource::new(path.as_ref(), 65_536).read_all_text()?;
        Self::from_batch(&batch)
    }

    /// Build from an all-text batch
    ///
    /// Rows whose code is not an integer (date formats, free text) are
    /// skipped.
    pub fn from_batch(batch: &RecordBatch) -> Result<Self> {
        let field_idx = batch
            .schema()
            .index_of(FIELD_NAME_COLUMN)
            .map_err(|_| Error::column_not_found(FIELD_NAME_COLUMN))?;
        if batch.num_columns() < 4 {
            return Err(Error::schema_mismatch(format!(
                "lookup table needs at least 4 columns, found {}",
                batch.num_columns()
            )));
        }

        let fields = batch.column(field_idx).as_string::<i32>();
        let codes = batch.column(2).as_string::<i32>();
        let labels = batch.column(3).as_string::<i32>();

        let mut rows = Vec::with_capacity(batch.num_rows());
        let mut skipped = 0usize;
        for ((field, code), label) in fields.iter().zip(codes.iter()).zip(labels.iter()) {
            let (Some(field), Some(code)) = (field, code.and_then(parse_integer)) else {
                skipped += 1;
                continue;
            };
            rows.push(LookupRow {
                field: field.to_string(),
                code,
                label: label.map(str::to_string),
            });
        }

        debug!(rows = rows.len(), skipped, "Loaded lookup table");
        Ok(Self { rows })
    }

    /// Number of usable rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no usable rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Code to label mapping for a field
    ///
    /// A later row for the same code replaces an earlier one. Code 0 with a
    /// missing label maps to the literal `"None"`.
    pub fn labels_for(&self, field: &str) -> LabelMap {
        let mut labels: LabelMap = self
            .rows
            .iter()
            .filter(|r| r.field == field)
            .map(|r| (r.code, r.label.clone()))
            .collect();

        if labels.get(&0).is_some_and(Option::is_none) {
            labels.insert(0, Some("None".to_string()));
        }
        labels
    }
}
