//! Master schema captured from the first batch of a source file

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use std::sync::Arc;

/// Semantic kind of a master-schema column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Nullable 64-bit integer
    Integer,
    /// Nullable 64-bit float
    Float,
    /// Raw text, passed through unchanged
    Text,
}

impl ColumnKind {
    /// Classify an inferred Arrow type
    pub fn from_data_type(data_type: &DataType) -> Self {
        if data_type.is_integer() {
            ColumnKind::Integer
        } else if data_type.is_floating() {
            ColumnKind::Float
        } else {
            ColumnKind::Text
        }
    }

    /// Arrow type written for this kind
    pub fn data_type(self) -> DataType {
        match self {
            ColumnKind::Integer => DataType::Int64,
            ColumnKind::Float => DataType::Float64,
            ColumnKind::Text => DataType::Utf8,
        }
    }
}

/// Fixed column order and types for one source file
///
/// Built once from an inferred schema and passed to every later batch step.
/// Only integer, float and text columns exist; any other inferred type
/// (dates, booleans) is carried as text.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterSchema {
    schema: SchemaRef,
    text: SchemaRef,
}

impl MasterSchema {
    /// Normalize an inferred schema into a master schema
    pub fn from_inferred(inferred: &Schema) -> Self {
        let fields: Vec<Field> = inferred
            .fields()
            .iter()
            .map(|f| {
                let kind = ColumnKind::from_data_type(f.data_type());
                Field::new(f.name(), kind.data_type(), true)
            })
            .collect();
        let text_fields: Vec<Field> = inferred
            .fields()
            .iter()
            .map(|f| Field::new(f.name(), DataType::Utf8, true))
            .collect();

        Self {
            schema: Arc::new(Schema::new(fields)),
            text: Arc::new(Schema::new(text_fields)),
        }
    }

    /// Typed output schema
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    /// Same columns, all typed as text (used for raw reads)
    pub fn text_schema(&self) -> SchemaRef {
        Arc::clone(&self.text)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.schema.fields().len()
    }

    /// Whether the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.schema.fields().is_empty()
    }

    /// Whether a column exists
    pub fn contains(&self, name: &str) -> bool {
        self.schema.index_of(name).is_ok()
    }

    /// Kind of a named column
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.schema
            .field_with_name(name)
            .ok()
            .map(|f| ColumnKind::from_data_type(f.data_type()))
    }

    /// Column names and kinds in order
    pub fn columns(&self) -> impl Iterator<Item = (&str, ColumnKind)> + '_ {
        self.schema
            .fields()
            .iter()
            .map(|f| (f.name().as_str(), ColumnKind::from_data_type(f.data_type())))
    }
}
