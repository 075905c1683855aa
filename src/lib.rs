//! # Road Safety ETL
//!
//! Converts large road-safety CSV exports into size-bounded Parquet shards,
//! and produces a labelled, de-duplicated accidents CSV from the coded
//! source table and its lookup sheet.
//!
//! ## Features
//!
//! - **Chunked Conversion**: Stream multi-GB CSVs in fixed-size batches with a
//!   schema fixed by the first batch
//! - **Shard Rollover**: Start a new `_partNN` file once the current one nears
//!   the size limit
//! - **Year Filter**: Keep only rows whose year column falls in a range
//! - **Small Files**: Load whole, write one file, split by row count if it
//!   came out too large
//! - **Label Cleaning**: Replace integer codes with lookup labels and derive a
//!   timestamp column
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use roadsafety_etl::config::ConvertConfig;
//! use roadsafety_etl::convert::run_conversion;
//!
//! let report = run_conversion(&ConvertConfig::default());
//! for shard in report.output_files() {
//!     println!("{} ({:.2} MB)", shard.file_name(), shard.size_mb());
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Batch Driver                           │
//! │   categories → sources → route by size → ConversionReport       │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴───────────────┬──────────────────┐
//! │    Decode    │            Convert            │      Output      │
//! ├──────────────┼───────────────────────────────┼──────────────────┤
//! │ CSV batches  │ Chunked (stream + filter)     │ ParquetWriter    │
//! │ MasterSchema │ Small (load + split)          │ ShardWriter      │
//! │ Coercion     │ Year filter                   │ Part naming      │
//! └──────────────┴───────────────────────────────┴──────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Labels: lookup table → relabel → timestamp → dedupe → CSV      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// YAML configuration
pub mod config;

/// CSV reading, schema inference and type coercion
pub mod decode;

/// Parquet writing and shard rollover
pub mod output;

/// CSV to Parquet conversion paths and the batch driver
pub mod convert;

/// Lookup-label cleaning of the accidents table
pub mod labels;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};

pub use config::{load_config, load_config_from_str, AppConfig};
pub use convert::{run_conversion, ConversionReport};
pub use labels::clean_accidents;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
