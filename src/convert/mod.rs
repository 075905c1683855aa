//! CSV to Parquet conversion
//!
//! Supports: chunked streaming for large files, single-pass loading for small
//! ones, and a batch job that routes every configured source by size.
//!
//! # Overview
//!
//! ```text
//! read batch → year filter → coerce to master schema → write → size check → rotate
//! ```

mod chunked;
mod filter;
mod pipeline;
mod small;
mod types;

pub use chunked::convert_large_csv_chunked;
pub use filter::filter_years;
pub use pipeline::{convert_file, run_conversion};
pub use small::convert_small_csv;
pub use types::{ConversionMethod, ConversionReport, FileConversion, FileOutcome, FileReport};
