//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, AppConfig, CleanConfig, ConvertConfig};
use crate::convert::{run_conversion, ConversionReport};
use crate::error::{Error, Result};
use crate::labels::{clean_accidents, CleanSummary};
use std::path::PathBuf;

const RULE: &str = "============================================================";

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Convert {
                output,
                category,
                max_shard_mb,
                batch_rows,
                chunked_threshold_mb,
            } => {
                let mut config = self.load_config()?.convert;
                if let Some(output) = output {
                    config.output_root.clone_from(output);
                }
                if let Some(mb) = max_shard_mb {
                    config.max_shard_mb = *mb;
                }
                if let Some(rows) = batch_rows {
                    config.batch_rows = *rows;
                }
                if let Some(mb) = chunked_threshold_mb {
                    config.chunked_threshold_mb = *mb;
                }
                if let Some(name) = category {
                    select_category(&mut config, name)?;
                }
                self.convert(&config)
            }
            Commands::Clean {
                accidents,
                lookups,
                output,
                day_first,
            } => {
                let mut config = self.load_config()?.clean;
                override_path(&mut config.accidents, accidents);
                override_path(&mut config.lookups, lookups);
                override_path(&mut config.output, output);
                config.day_first |= *day_first;
                self.clean(&config)
            }
            Commands::Config => self.show_config(),
        }
    }

    /// Load configuration from the `--config` file, or defaults
    fn load_config(&self) -> Result<AppConfig> {
        match &self.cli.config {
            Some(path) => load_config(path),
            None => Ok(AppConfig::default()),
        }
    }

    fn convert(&self, config: &ConvertConfig) -> Result<()> {
        config.validate()?;

        if self.cli.format == OutputFormat::Pretty {
            println!("{RULE}");
            println!("CSV to Parquet Conversion (Memory Optimized)");
            println!("{RULE}");
            for category in &config.categories {
                if let Some(filter) = category.year_filter {
                    println!(
                        "\nNote: {} files will be filtered to {}-{} only",
                        category.name, filter.from, filter.to
                    );
                }
            }
        }

        let report = run_conversion(config);

        match self.cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Pretty => print_conversion_report(&report, config),
        }
        Ok(())
    }

    fn clean(&self, config: &CleanConfig) -> Result<()> {
        config.validate()?;
        let summary = clean_accidents(config)?;

        match self.cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
            OutputFormat::Pretty => print_clean_summary(&summary),
        }
        Ok(())
    }

    fn show_config(&self) -> Result<()> {
        let config = self.load_config()?;
        match self.cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
            OutputFormat::Pretty => print!("{}", serde_yaml::to_string(&config)?),
        }
        Ok(())
    }
}

fn override_path(target: &mut PathBuf, value: &Option<PathBuf>) {
    if let Some(value) = value {
        target.clone_from(value);
    }
}

fn select_category(config: &mut ConvertConfig, name: &str) -> Result<()> {
    let known: Vec<String> = config.categories.iter().map(|c| c.name.clone()).collect();
    config.categories.retain(|c| c.name == name);
    if config.categories.is_empty() {
        return Err(Error::config(format!(
            "Unknown category '{name}'. Configured: {}",
            known.join(", ")
        )));
    }
    Ok(())
}

fn print_conversion_report(report: &ConversionReport, config: &ConvertConfig) {
    for source in report.missing() {
        println!("\nWarning: {} not found, skipped", source.display());
    }
    for (source, error) in report.failures() {
        println!("\nError converting {}: {error}", source.display());
    }

    println!("\n{RULE}");
    println!("Conversion Complete!");
    println!("{RULE}");
    println!("Total output files: {}", report.total_outputs());
    println!(
        "\nParquet files saved in: {}/",
        config.output_root.display()
    );

    println!("\nFiles created:");
    for category in &config.categories {
        let files = report.category_files(&category.name);
        if files.is_empty() {
            continue;
        }
        println!("\n  {}:", category.name);
        for file in files {
            println!("    - {} ({:.2} MB)", file.file_name(), file.size_mb());
        }
    }
}

fn print_clean_summary(summary: &CleanSummary) {
    println!("Rows read: {}", summary.rows_read);
    println!("Duplicates dropped: {}", summary.duplicates_dropped);
    println!(
        "Rows written: {} ({} columns)",
        summary.rows_written, summary.columns
    );
    for (field, count) in &summary.replaced {
        println!("  {field}: {count} values labelled");
    }
    println!("Saved: {}", summary.output.display());
}
