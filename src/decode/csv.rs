//! Streaming CSV source
//!
//! Wraps `arrow::csv` so a source file can be read twice: once with type
//! inference over its head to fix the master schema, and once in full as
//! raw text batches.

use super::schema::MasterSchema;
use crate::error::{Error, Result};
use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::{Reader, ReaderBuilder};
use arrow::record_batch::RecordBatch;
use std::fs::File;
use std::path::{Path, PathBuf};

const DELIMITER: u8 = b',';

/// Comma-delimited CSV source file with a header row
#[derive(Debug, Clone)]
pub struct CsvSource {
    /// Path to the source file
    path: PathBuf,
    /// Rows per batch
    batch_rows: usize,
}

impl CsvSource {
    /// Create a comma-delimited source with a header row
    pub fn new(path: impl Into<PathBuf>, batch_rows: usize) -> Self {
        Self {
            path: path.into(),
            batch_rows,
        }
    }

    /// Source path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without extension, used as the output base name
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string())
    }

    /// Size of the source file in bytes
    pub fn size_bytes(&self) -> Result<u64> {
        let metadata = std::fs::metadata(&self.path).map_err(|e| self.io_error(e))?;
        Ok(metadata.len())
    }

    fn format(&self) -> Format {
        Format::default()
            .with_header(true)
            .with_delimiter(DELIMITER)
    }

    fn open(&self) -> Result<File> {
        File::open(&self.path).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, e: std::io::Error) -> Error {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::file_not_found(&self.path)
        } else {
            Error::Io(e)
        }
    }

    /// Infer the master schema from the first batch of rows
    pub fn infer_master_schema(&self) -> Result<MasterSchema> {
        self.infer(Some(self.batch_rows))
    }

    /// Infer the master schema from every row in the file
    pub fn infer_full_schema(&self) -> Result<MasterSchema> {
        self.infer(None)
    }

    fn infer(&self, max_records: Option<usize>) -> Result<MasterSchema> {
        let file = self.open()?;
        let (inferred, _) = self
            .format()
            .infer_schema(file, max_records)
            .map_err(|e| Error::schema_inference(&self.path, e.to_string()))?;

        let schema = MasterSchema::from_inferred(&inferred);
        if schema.is_empty() {
            return Err(Error::schema_inference(&self.path, "file has no columns"));
        }
        Ok(schema)
    }

    /// Stream the whole file from the start with every column as text
    pub fn text_batches(&self, schema: &MasterSchema) -> Result<TextBatches> {
        let file = self.open()?;
        let reader = ReaderBuilder::new(schema.text_schema())
            .with_header(true)
            .with_delimiter(DELIMITER)
            .with_batch_size(self.batch_rows)
            .build(file)?;

        Ok(TextBatches {
            reader,
            path: self.path.clone(),
        })
    }

    /// Load the whole file as one all-text batch
    pub fn read_all_text(&self) -> Result<RecordBatch> {
        // Only the header matters for a text read
        let schema = self.infer(Some(1))?;
        let batches = self.text_batches(&schema)?.collect::<Result<Vec<_>>>()?;
        Ok(concat_batches(&schema.text_schema(), &batches)?)
    }
}

/// Iterator over raw text batches of a source file
pub struct TextBatches {
    reader: Reader<File>,
    path: PathBuf,
}

impl Iterator for TextBatches {
    type Item = Result<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader
            .next()
            .map(|r| r.map_err(|e| Error::csv_parse(&self.path, e.to_string())))
    }
}
