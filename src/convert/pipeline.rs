//! Batch conversion job
//!
//! Walks every configured category and source. Failures are contained per
//! file: a missing source is a warning, a failed conversion is logged and the
//! run moves on to the next file.

use super::chunked::convert_large_csv_chunked;
use super::small::convert_small_csv;
use super::types::{ConversionReport, FileConversion, FileOutcome};
use crate::config::{ConvertConfig, YearFilter, BYTES_PER_MB};
use crate::decode::CsvSource;
use crate::error::{Result, ResultExt};
use std::error::Error as _;
use std::path::Path;
use tracing::{error, info, warn};

/// Convert one file, choosing the path by source size
///
/// A source that does not exist yields an error for which
/// [`crate::Error::is_missing_input`] holds; conversion errors carry the
/// source path.
pub fn convert_file(
    source: &Path,
    output_dir: &Path,
    year_filter: Option<YearFilter>,
    config: &ConvertConfig,
) -> Result<FileConversion> {
    let size = CsvSource::new(source, config.batch_rows).size_bytes()?;
    info!("CSV file size: {:.2} MB", size as f64 / BYTES_PER_MB as f64);

    let converted = if size > config.chunked_threshold_bytes() {
        convert_large_csv_chunked(source, output_dir, year_filter, config)
    } else {
        convert_small_csv(source, output_dir, config)
    };
    converted.with_context(|| format!("Failed to convert '{}'", source.display()))
}

/// Run the conversion over every configured category
pub fn run_conversion(config: &ConvertConfig) -> ConversionReport {
    let mut report = ConversionReport::default();

    for category in &config.categories {
        info!("Category: {}", category.name);
        let output_dir = config.output_dir(&category.name);

        for source in &category.sources {
            let outcome = match convert_file(source, &output_dir, category.year_filter, config) {
                Ok(conversion) => FileOutcome::Converted { conversion },
                Err(e) if e.is_missing_input() => {
                    warn!("{} not found, skipping...", source.display());
                    FileOutcome::Missing
                }
                Err(e) => {
                    let chain = error_chain(&e);
                    error!(
                        source = %source.display(),
                        error = ?e,
                        "Error converting {}: {}",
                        source.display(),
                        chain
                    );
                    FileOutcome::Failed { error: chain }
                }
            };
            report.push(&category.name, source, outcome);
        }
    }

    info!("Total output files: {}", report.total_outputs());
    report
}

/// Render an error with its source chain
fn error_chain(e: &crate::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
