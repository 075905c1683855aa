//! Size-bounded output shards
//!
//! A [`ShardWriter`] appends batches to `<stem>_partNN.parquet` files and
//! rolls over to the next part once the written size of the open part reaches
//! the rollover threshold. Size is checked only after a write, so a part can
//! overshoot the threshold by up to one batch.

use super::writer::{ParquetWriter, ParquetWriterConfig};
use crate::config::BYTES_PER_MB;
use crate::error::{Error, Result};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// File name of an unsplit output
pub fn single_file_name(stem: &str) -> String {
    format!("{stem}.parquet")
}

/// File name of a numbered part (1-indexed, two digits minimum)
pub fn part_file_name(stem: &str, part: u32) -> String {
    format!("{stem}_part{part:02}.parquet")
}

/// A finalized output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardInfo {
    /// Path of the file
    pub path: PathBuf,
    /// Part number, `None` for an unsplit file
    pub part: Option<u32>,
    /// Rows in the file
    pub rows: usize,
    /// Final size on disk
    pub bytes: u64,
}

impl ShardInfo {
    /// Stat a finished file
    pub fn from_file(path: impl Into<PathBuf>, part: Option<u32>, rows: usize) -> Result<Self> {
        let path = path.into();
        let bytes = fs::metadata(&path)?.len();
        Ok(Self {
            path,
            part,
            rows,
            bytes,
        })
    }

    /// Size in megabytes
    pub fn size_mb(&self) -> f64 {
        self.bytes as f64 / BYTES_PER_MB as f64
    }

    /// File name component of the path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Writes batches into rolling Parquet parts sharing one schema
pub struct ShardWriter {
    dir: PathBuf,
    stem: String,
    schema: SchemaRef,
    config: ParquetWriterConfig,
    rollover_bytes: u64,
    next_part: u32,
    current: Option<ParquetWriter>,
    sealed: Vec<ShardInfo>,
}

impl ShardWriter {
    /// Create a shard writer; no file is opened until the first write
    pub fn new(
        dir: impl Into<PathBuf>,
        stem: impl Into<String>,
        schema: SchemaRef,
        rollover_bytes: u64,
        config: ParquetWriterConfig,
    ) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
            schema,
            config,
            rollover_bytes,
            next_part: 1,
            current: None,
            sealed: Vec::new(),
        }
    }

    /// Whether a part is currently open
    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Parts sealed so far, in order
    pub fn sealed(&self) -> &[ShardInfo] {
        &self.sealed
    }

    /// Append a batch, opening a part if needed and sealing it once full
    ///
    /// Returns the sealed part when this write triggered a rollover.
    pub fn write(&mut self, batch: &RecordBatch) -> Result<Option<&ShardInfo>> {
        if batch.schema() != self.schema {
            return Err(Error::schema_mismatch(format!(
                "batch schema {:?} does not match shard schema {:?}",
                batch.schema(),
                self.schema
            )));
        }

        if self.current.is_none() {
            self.current = Some(self.open_part()?);
        }
        let writer = self
            .current
            .as_mut()
            .ok_or_else(|| Error::output("no open shard"))?;

        writer.write(batch)?;
        writer.flush()?;

        let written = writer.bytes_written();
        debug!(
            path = %writer.path().display(),
            bytes = written,
            rows = writer.rows_written(),
            "Wrote batch"
        );

        if written >= self.rollover_bytes {
            self.seal()?;
            return Ok(self.sealed.last());
        }
        Ok(None)
    }

    /// Seal any open part and return every sealed part in order
    pub fn finish(mut self) -> Result<Vec<ShardInfo>> {
        if self.current.is_some() {
            self.seal()?;
        }
        Ok(std::mem::take(&mut self.sealed))
    }

    /// Close the open part without recording it
    ///
    /// Used on the failure path so no file handle is left dangling. The
    /// partially written part stays on disk.
    pub fn abort(&mut self) {
        if let Some(writer) = self.current.take() {
            let path = writer.path().to_path_buf();
            match writer.close() {
                Ok(rows) => warn!(path = %path.display(), rows, "Closed incomplete shard"),
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to close shard"),
            }
        }
    }

    fn open_part(&mut self) -> Result<ParquetWriter> {
        let part = self.next_part;
        self.next_part += 1;
        let path = self.dir.join(part_file_name(&self.stem, part));
        debug!(path = %path.display(), part, "Opening shard");
        ParquetWriter::new(path, self.schema.clone(), &self.config)
    }

    fn seal(&mut self) -> Result<()> {
        let Some(writer) = self.current.take() else {
            return Ok(());
        };
        let path = writer.path().to_path_buf();
        let part = self.next_part - 1;
        let rows = writer.close()?;

        let info = ShardInfo::from_file(path, Some(part), rows)?;
        info!(
            "Part {}: {} rows, {:.2} MB -> {}",
            part,
            info.rows,
            info.size_mb(),
            info.file_name()
        );
        self.sealed.push(info);
        Ok(())
    }
}

impl Drop for ShardWriter {
    fn drop(&mut self) {
        self.abort();
    }
}
