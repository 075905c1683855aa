//! Chunked converter for large CSV files
//!
//! The file is read twice: the first `batch_rows` rows fix the master
//! schema, then the whole file is streamed as text and each batch is coerced
//! to that schema before being appended to the open shard. At no point is
//! more than one batch held in memory.

use super::filter::filter_years;
use super::types::{ConversionMethod, FileConversion};
use crate::config::{ConvertConfig, YearFilter};
use crate::decode::{coerce_batch, CsvSource, MasterSchema};
use crate::error::Result;
use crate::output::{ParquetWriterConfig, ShardWriter};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct StreamStats {
    rows_written: usize,
    rows_filtered: usize,
}

/// Convert a large CSV to Parquet shards without loading it whole
///
/// The year filter is applied only when the source has the configured year
/// column. On any error the open shard is closed before the error is
/// returned; shards sealed earlier stay on disk.
pub fn convert_large_csv_chunked(
    source_path: &Path,
    output_dir: &Path,
    year_filter: Option<YearFilter>,
    config: &ConvertConfig,
) -> Result<FileConversion> {
    let source = CsvSource::new(source_path, config.batch_rows);
    fs::create_dir_all(output_dir)?;

    info!("Processing: {}", source_path.display());
    if let Some(filter) = year_filter {
        info!("Filtering data from {} to {}", filter.from, filter.to);
    }

    let schema = source.infer_master_schema()?;
    info!("Schema established with {} columns", schema.len());

    let mut shards = ShardWriter::new(
        output_dir,
        source.stem(),
        schema.schema(),
        config.rollover_bytes(),
        ParquetWriterConfig::default(),
    );

    let mut stats = StreamStats::default();
    let streamed = stream_batches(
        &source,
        &schema,
        year_filter,
        config,
        &mut shards,
        &mut stats,
    );
    if let Err(e) = streamed {
        shards.abort();
        return Err(e);
    }
    let sealed = shards.finish()?;

    if sealed.is_empty() {
        warn!(
            source = %source_path.display(),
            rows_filtered = stats.rows_filtered,
            "No rows written, no output produced"
        );
    }
    info!("Total rows processed: {}", stats.rows_written);
    if stats.rows_filtered > 0 {
        info!("Rows filtered out: {}", stats.rows_filtered);
    }
    info!("Saved as {} file(s)", sealed.len());

    Ok(FileConversion {
        source: source_path.to_path_buf(),
        method: ConversionMethod::Chunked,
        shards: sealed,
        rows_written: stats.rows_written,
        rows_filtered: stats.rows_filtered,
    })
}

fn stream_batches(
    source: &CsvSource,
    schema: &MasterSchema,
    year_filter: Option<YearFilter>,
    config: &ConvertConfig,
    shards: &mut ShardWriter,
    stats: &mut StreamStats,
) -> Result<()> {
    let year_filter = year_filter.filter(|_| schema.contains(&config.year_column));

    for (batch_num, batch) in (1..).zip(source.text_batches(schema)?) {
        let mut batch = batch?;

        if let Some(filter) = &year_filter {
            let (kept, dropped) = filter_years(&batch, &config.year_column, filter)?;
            stats.rows_filtered += dropped;
            if kept.num_rows() == 0 {
                debug!(batch = batch_num, dropped, "Batch fully filtered");
                continue;
            }
            batch = kept;
        }

        let typed = coerce_batch(&batch, schema)?;
        stats.rows_written += typed.num_rows();
        shards.write(&typed)?;

        if config.progress_every > 0 && batch_num % config.progress_every == 0 {
            info!("Processed {} rows...", stats.rows_written);
        }
    }

    Ok(())
}
