//! Parquet file writer
//!
//! Provides utilities for writing Arrow RecordBatches to Parquet files.

use crate::error::{Error, Result};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
        }
    }
}

impl ParquetWriterConfig {
    /// Get compression codec
    #[must_use]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Build writer properties
    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }
}

/// Parquet file writer bound to one output path
pub struct ParquetWriter {
    /// Arrow writer
    writer: ArrowWriter<File>,
    /// Destination path
    path: PathBuf,
    /// Number of rows written
    rows_written: usize,
}

impl ParquetWriter {
    /// Create a new Parquet writer, truncating any existing file
    pub fn new(
        path: impl AsRef<Path>,
        schema: SchemaRef,
        config: &ParquetWriterConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::Output {
            message: format!("Failed to create file '{}': {e}", path.display()),
        })?;

        debug!(
            path = %path.display(),
            compression = ?config.compression(),
            "Opening Parquet file"
        );
        let props = config.build_properties();
        let writer = ArrowWriter::try_new(file, schema, Some(props)).map_err(|e| Error::Output {
            message: format!("Failed to create Parquet writer: {e}"),
        })?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            rows_written: 0,
        })
    }

    /// Write a RecordBatch to the file
    ///
    /// The batch schema must equal the writer schema.
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer.write(batch).map_err(|e| Error::Output {
            message: format!("Failed to write batch to '{}': {e}", self.path.display()),
        })?;

        self.rows_written += batch.num_rows();
        Ok(())
    }

    /// Close the in-progress row group so its bytes reach the file
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| Error::Output {
            message: format!("Failed to flush row group: {e}"),
        })
    }

    /// Bytes written to the file so far (excludes buffered rows)
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.writer.bytes_written() as u64
    }

    /// Get the number of rows written so far
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Destination path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the writer and finalize the file
    pub fn close(self) -> Result<usize> {
        let rows = self.rows_written;
        self.writer.close().map_err(|e| Error::Output {
            message: format!("Failed to close Parquet writer: {e}"),
        })?;
        Ok(rows)
    }
}

/// Write a single RecordBatch to a Snappy-compressed Parquet file
pub fn write_batch_to_parquet(path: impl AsRef<Path>, batch: &RecordBatch) -> Result<usize> {
    let mut writer = ParquetWriter::new(path, batch.schema(), &ParquetWriterConfig::default())?;
    writer.write(batch)?;
    writer.close()
}
