//! Single-pass converter for files under the chunking threshold

use super::types::{ConversionMethod, FileConversion};
use crate::config::ConvertConfig;
use crate::decode::{coerce_batch, CsvSource};
use crate::error::Result;
use crate::output::{part_file_name, single_file_name, write_batch_to_parquet, ShardInfo};
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use std::fs;
use std::path::Path;
use tracing::info;

/// Convert a CSV by loading it whole
///
/// Writes `<stem>.parquet`. When that file is larger than the maximum shard
/// size it is deleted and the rows are rewritten as `n = size / max + 1`
/// equal-row parts. The year filter does not apply on this path.
pub fn convert_small_csv(
    source_path: &Path,
    output_dir: &Path,
    config: &ConvertConfig,
) -> Result<FileConversion> {
    let source = CsvSource::new(source_path, config.batch_rows);
    fs::create_dir_all(output_dir)?;

    info!("Processing: {}", source_path.display());
    let schema = source.infer_full_schema()?;
    let batches = source
        .text_batches(&schema)?
        .map(|batch| batch.and_then(|b| coerce_batch(&b, &schema)))
        .collect::<Result<Vec<RecordBatch>>>()?;
    let table = concat_batches(&schema.schema(), &batches)?;
    drop(batches);

    let total_rows = table.num_rows();
    info!("Rows: {}", total_rows);
    info!("Columns: {}", table.num_columns());

    let stem = source.stem();
    let single_path = output_dir.join(single_file_name(&stem));
    write_batch_to_parquet(&single_path, &table)?;
    let single = ShardInfo::from_file(&single_path, None, total_rows)?;
    info!("Parquet size: {:.2} MB", single.size_mb());

    let max_bytes = config.max_shard_bytes();
    if single.bytes <= max_bytes {
        info!("Saved as single file: {}", single.file_name());
        return Ok(FileConversion {
            source: source_path.to_path_buf(),
            method: ConversionMethod::Single,
            shards: vec![single],
            rows_written: total_rows,
            rows_filtered: 0,
        });
    }

    info!("File exceeds {}MB, splitting...", config.max_shard_mb);
    fs::remove_file(&single_path)?;

    let num_splits = (single.bytes / max_bytes + 1) as usize;
    let rows_per_split = total_rows / num_splits + 1;

    let mut shards = Vec::with_capacity(num_splits);
    for i in 0..num_splits {
        let start = i * rows_per_split;
        if start >= total_rows {
            break;
        }
        let len = rows_per_split.min(total_rows - start);
        let part = (i + 1) as u32;
        let path = output_dir.join(part_file_name(&stem, part));

        let rows = write_batch_to_parquet(&path, &table.slice(start, len))?;
        let shard = ShardInfo::from_file(&path, Some(part), rows)?;
        info!(
            "Part {}/{}: {} rows, {:.2} MB -> {}",
            part,
            num_splits,
            shard.rows,
            shard.size_mb(),
            shard.file_name()
        );
        shards.push(shard);
    }

    Ok(FileConversion {
        source: source_path.to_path_buf(),
        method: ConversionMethod::Split,
        shards,
        rows_written: total_rows,
        rows_filtered: 0,
    })
}
