//! CLI module
//!
//! Command-line interface for conversion and cleaning runs.
//!
//! # Commands
//!
//! - `convert` - Convert configured CSV files to Parquet shards
//! - `clean` - Replace coded values with labels and write a cleaned CSV
//! - `config` - Print the effective configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
