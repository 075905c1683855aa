//! Conversion result types

use crate::output::ShardInfo;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// How a source file was converted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMethod {
    /// Streamed in batches with size-based rollover
    Chunked,
    /// Loaded whole and written as one file
    Single,
    /// Loaded whole and split by row count after exceeding the size limit
    Split,
}

/// Result of converting one source file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileConversion {
    /// Source CSV
    pub source: PathBuf,
    /// Path taken
    pub method: ConversionMethod,
    /// Output files in part order
    pub shards: Vec<ShardInfo>,
    /// Rows persisted across all outputs
    pub rows_written: usize,
    /// Rows dropped by the year filter
    pub rows_filtered: usize,
}

impl FileConversion {
    /// Output paths in part order
    pub fn paths(&self) -> Vec<&Path> {
        self.shards.iter().map(|s| s.path.as_path()).collect()
    }
}

/// Outcome of one configured source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Converted successfully
    Converted { conversion: FileConversion },
    /// Source file did not exist
    Missing,
    /// Conversion failed; sealed shards may remain on disk
    Failed { error: String },
}

/// Per-source entry in the run report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    /// Category the source belongs to
    pub category: String,
    /// Source path as configured
    pub source: PathBuf,
    /// What happened
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Report for a whole batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionReport {
    /// One entry per configured source, in processing order
    pub files: Vec<FileReport>,
}

impl ConversionReport {
    /// Record an outcome
    pub fn push(&mut self, category: &str, source: &Path, outcome: FileOutcome) {
        self.files.push(FileReport {
            category: category.to_string(),
            source: source.to_path_buf(),
            outcome,
        });
    }

    /// Every output file produced, in processing order
    pub fn output_files(&self) -> Vec<&ShardInfo> {
        self.files
            .iter()
            .filter_map(|f| match &f.outcome {
                FileOutcome::Converted { conversion } => Some(conversion.shards.iter()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Output files produced for one category
    pub fn category_files(&self, category: &str) -> Vec<&ShardInfo> {
        self.files
            .iter()
            .filter(|f| f.category == category)
            .filter_map(|f| match &f.outcome {
                FileOutcome::Converted { conversion } => Some(conversion.shards.iter()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Number of output files produced
    pub fn total_outputs(&self) -> usize {
        self.output_files().len()
    }

    /// Sources that were missing
    pub fn missing(&self) -> Vec<&Path> {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Missing))
            .map(|f| f.source.as_path())
            .collect()
    }

    /// Sources that failed, with their error text
    pub fn failures(&self) -> Vec<(&Path, &str)> {
        self.files
            .iter()
            .filter_map(|f| match &f.outcome {
                FileOutcome::Failed { error } => Some((f.source.as_path(), error.as_str())),
                _ => None,
            })
            .collect()
    }
}
