//! Output module
//!
//! Handles Parquet file writing and size-bounded sharding.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Writing Arrow RecordBatches to Snappy-compressed Parquet files
//! - Naming output shards (`<stem>.parquet`, `<stem>_partNN.parquet`)
//! - Rolling a stream of batches over into new shards at a size threshold

mod shard;
mod writer;

pub use shard::{part_file_name, single_file_name, ShardInfo, ShardWriter};
pub use writer::{write_batch_to_parquet, ParquetWriter, ParquetWriterConfig};
