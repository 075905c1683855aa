//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Road-safety CSV to Parquet conversion and cleanup
#[derive(Parser, Debug)]
#[command(name = "roadsafety-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert configured CSV files to Parquet
    Convert {
        /// Output root (one subdirectory per category)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only convert this category
        #[arg(long)]
        category: Option<String>,

        /// Maximum shard size in MB
        #[arg(long)]
        max_shard_mb: Option<u64>,

        /// Rows per streamed batch
        #[arg(long)]
        batch_rows: Option<usize>,

        /// Files above this size (MB) are streamed in batches
        #[arg(long)]
        chunked_threshold_mb: Option<u64>,
    },

    /// Replace coded values with labels and write a cleaned CSV
    Clean {
        /// Coded accidents CSV
        #[arg(long)]
        accidents: Option<PathBuf>,

        /// Lookup table CSV
        #[arg(long)]
        lookups: Option<PathBuf>,

        /// Cleaned CSV destination
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read ambiguous slash dates as day/month
        #[arg(long)]
        day_first: bool,
    },

    /// Print the effective configuration as YAML
    Config,
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON report on stdout
    Json,
    /// Human-readable summary
    Pretty,
}
