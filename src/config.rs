//! Configuration types for conversion and cleaning runs
//!
//! Everything that used to be a hardcoded path or constant lives here, so a
//! run can be pointed at temporary fixtures. Configuration is loaded from
//! YAML; every field has a default that reproduces the stock dataset layout.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Bytes per megabyte (binary)
pub const BYTES_PER_MB: u64 = 1024 * 1024;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete application configuration loaded from YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// CSV to Parquet conversion settings
    #[serde(default)]
    pub convert: ConvertConfig,

    /// Label replacement settings
    #[serde(default)]
    pub clean: CleanConfig,
}

// ============================================================================
// Conversion Config
// ============================================================================

/// Settings for the CSV to Parquet batch job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Root directory for Parquet output (one subdirectory per category)
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Maximum shard size in MB
    #[serde(default = "default_max_shard_mb")]
    pub max_shard_mb: u64,

    /// Rows per streamed batch
    #[serde(default = "default_batch_rows")]
    pub batch_rows: usize,

    /// Files larger than this (MB) take the chunked path
    #[serde(default = "default_chunked_threshold_mb")]
    pub chunked_threshold_mb: u64,

    /// Fraction of `max_shard_mb` at which a shard is sealed
    #[serde(default = "default_rollover_fraction")]
    pub rollover_fraction: f64,

    /// Column the year filter applies to
    #[serde(default = "default_year_column")]
    pub year_column: String,

    /// Log a progress line every N batches
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,

    /// Source categories, processed in order
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            max_shard_mb: default_max_shard_mb(),
            batch_rows: default_batch_rows(),
            chunked_threshold_mb: default_chunked_threshold_mb(),
            rollover_fraction: default_rollover_fraction(),
            year_column: default_year_column(),
            progress_every: default_progress_every(),
            categories: default_categories(),
        }
    }
}

impl ConvertConfig {
    /// Maximum shard size in bytes
    pub fn max_shard_bytes(&self) -> u64 {
        self.max_shard_mb * BYTES_PER_MB
    }

    /// Written size at which an open shard is sealed
    pub fn rollover_bytes(&self) -> u64 {
        (self.max_shard_bytes() as f64 * self.rollover_fraction) as u64
    }

    /// Source size above which the chunked converter is used
    pub fn chunked_threshold_bytes(&self) -> u64 {
        self.chunked_threshold_mb * BYTES_PER_MB
    }

    /// Output directory for a category
    pub fn output_dir(&self, category: &str) -> PathBuf {
        self.output_root.join(category)
    }

    /// Validate the conversion settings
    pub fn validate(&self) -> Result<()> {
        if self.max_shard_mb == 0 {
            return Err(Error::invalid_value("max_shard_mb", "must be positive"));
        }
        if self.batch_rows == 0 {
            return Err(Error::invalid_value("batch_rows", "must be positive"));
        }
        if !(self.rollover_fraction > 0.0 && self.rollover_fraction <= 1.0) {
            return Err(Error::invalid_value(
                "rollover_fraction",
                format!("must be in (0, 1], got {}", self.rollover_fraction),
            ));
        }
        if self.year_column.is_empty() {
            return Err(Error::invalid_value("year_column", "cannot be empty"));
        }
        if self.progress_every == 0 {
            return Err(Error::invalid_value("progress_every", "must be positive"));
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.name.is_empty() {
                return Err(Error::config("Category name cannot be empty"));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(Error::config(format!(
                    "Duplicate category name: {}",
                    category.name
                )));
            }
            if let Some(filter) = &category.year_filter {
                filter.validate()?;
            }
        }

        Ok(())
    }
}

fn default_output_root() -> PathBuf {
    PathBuf::from("data/parquet")
}

fn default_max_shard_mb() -> u64 {
    50
}

fn default_batch_rows() -> usize {
    100_000
}

fn default_chunked_threshold_mb() -> u64 {
    500
}

fn default_rollover_fraction() -> f64 {
    0.9
}

fn default_year_column() -> String {
    "collision_year".to_string()
}

fn default_progress_every() -> usize {
    10
}

fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig {
            name: "2025_dataset".to_string(),
            sources: vec![
                PathBuf::from("data/2025_dataset/collision-provisional-2025.csv"),
                PathBuf::from("data/2025_dataset/vehicle-provisional-2025.csv"),
                PathBuf::from("data/2025_dataset/casualty-provisional-2025.csv"),
            ],
            year_filter: None,
        },
        CategoryConfig {
            name: "2024_prior".to_string(),
            sources: vec![
                PathBuf::from("data/2024_prior/collision-1979-2024.csv"),
                PathBuf::from("data/2024_prior/vehicle-1979-2024.csv"),
                PathBuf::from("data/2024_prior/casualty-1979-2024.csv"),
            ],
            year_filter: Some(YearFilter {
                from: 2015,
                to: 2024,
            }),
        },
    ]
}

// ============================================================================
// Category Config
// ============================================================================

/// A named group of source files sharing an output directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Category name, also the output subdirectory
    pub name: String,

    /// Source CSV files in processing order
    #[serde(default)]
    pub sources: Vec<PathBuf>,

    /// Optional inclusive year range for chunked conversion
    #[serde(default)]
    pub year_filter: Option<YearFilter>,
}

/// Inclusive year range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearFilter {
    /// Lower bound (inclusive)
    pub from: i64,
    /// Upper bound (inclusive)
    pub to: i64,
}

impl YearFilter {
    /// Create a new year filter
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    /// Whether a parsed year lies within the range
    pub fn contains(&self, year: f64) -> bool {
        year >= self.from as f64 && year <= self.to as f64
    }

    /// Validate bound ordering
    pub fn validate(&self) -> Result<()> {
        if self.from > self.to {
            return Err(Error::invalid_value(
                "year_filter",
                format!("from ({}) is after to ({})", self.from, self.to),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Clean Config
// ============================================================================

/// Settings for label replacement on the accidents table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanConfig {
    /// Coded accidents CSV
    #[serde(default = "default_accidents")]
    pub accidents: PathBuf,

    /// Lookup table CSV
    #[serde(default = "default_lookups")]
    pub lookups: PathBuf,

    /// Cleaned CSV destination
    #[serde(default = "default_clean_output")]
    pub output: PathBuf,

    /// Coded fields to replace with labels
    #[serde(default = "default_label_fields")]
    pub fields: Vec<String>,

    /// Date column
    #[serde(default = "default_date_column")]
    pub date_column: String,

    /// Time column
    #[serde(default = "default_time_column")]
    pub time_column: String,

    /// Derived timestamp column
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,

    /// Read ambiguous slash dates as day/month
    #[serde(default)]
    pub day_first: bool,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            accidents: default_accidents(),
            lookups: default_lookups(),
            output: default_clean_output(),
            fields: default_label_fields(),
            date_column: default_date_column(),
            time_column: default_time_column(),
            timestamp_column: default_timestamp_column(),
            day_first: false,
        }
    }
}

impl CleanConfig {
    /// Validate the cleaning settings
    pub fn validate(&self) -> Result<()> {
        if self.date_column.is_empty() || self.time_column.is_empty() {
            return Err(Error::config("Date and time columns must be named"));
        }
        if self.timestamp_column.is_empty() {
            return Err(Error::invalid_value("timestamp_column", "cannot be empty"));
        }
        Ok(())
    }
}

fn default_accidents() -> PathBuf {
    PathBuf::from("data/accident-data.csv")
}

fn default_lookups() -> PathBuf {
    PathBuf::from("data/road-safety-lookups.csv")
}

fn default_clean_output() -> PathBuf {
    PathBuf::from("data/accidents_cleaned.csv")
}

fn default_label_fields() -> Vec<String> {
    [
        "urban_or_rural_area",
        "carriageway_hazards",
        "special_conditions_at_site",
        "road_surface_conditions",
        "weather_conditions",
        "light_conditions",
        "pedestrian_crossing_human_control",
        "pedestrian_crossing_physical_facilities",
        "second_road_class",
        "junction_control",
        "road_type",
        "first_road_class",
        "junction_detail",
        "day_of_week",
        "accident_severity",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_date_column() -> String {
    "date".to_string()
}

fn default_time_column() -> String {
    "time".to_string()
}

fn default_timestamp_column() -> String {
    "timestamp".to_string()
}

// ============================================================================
// Loading
// ============================================================================

/// Load configuration from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::config(format!("Config file '{}' not found", path.display()))
        } else {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_config_from_str(&content)
}

/// Load configuration from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<AppConfig> {
    let config: AppConfig = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse config YAML: {e}")))?;

    config.convert.validate()?;
    config.clean.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_stock_layout() {
        let config = ConvertConfig::default();
        assert_eq!(config.max_shard_bytes(), 50 * 1024 * 1024);
        assert_eq!(config.rollover_bytes(), 47_185_920);
        assert_eq!(config.chunked_threshold_bytes(), 500 * 1024 * 1024);
        assert_eq!(config.batch_rows, 100_000);
        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.categories[0].year_filter, None);
        assert_eq!(
            config.categories[1].year_filter,
            Some(YearFilter::new(2015, 2024))
        );
        assert_eq!(
            config.output_dir("2024_prior"),
            PathBuf::from("data/parquet/2024_prior")
        );
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = load_config_from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r"
convert:
  output_root: /tmp/out
  max_shard_mb: 10
  categories:
    - name: fixtures
      sources: [a.csv, b.csv]
      year_filter: { from: 2000, to: 2010 }
clean:
  day_first: true
";
        let config = load_config_from_str(yaml).unwrap();
        assert_eq!(config.convert.output_root, PathBuf::from("/tmp/out"));
        assert_eq!(config.convert.max_shard_mb, 10);
        assert_eq!(config.convert.batch_rows, 100_000);
        assert_eq!(config.convert.categories.len(), 1);
        assert_eq!(config.convert.categories[0].sources.len(), 2);
        assert!(config.clean.day_first);
        assert_eq!(config.clean.fields.len(), 15);
    }

    #[test]
    fn test_rejects_bad_fraction() {
        let err = load_config_from_str("convert:\n  rollover_fraction: 1.5\n").unwrap_err();
        assert!(err.to_string().contains("rollover_fraction"));
    }

    #[test]
    fn test_rejects_zero_batch_rows() {
        assert!(load_config_from_str("convert:\n  batch_rows: 0\n").is_err());
    }

    #[test]
    fn test_rejects_duplicate_categories() {
        let yaml = r"
convert:
  categories:
    - name: a
    - name: a
";
        let err = load_config_from_str(yaml).unwrap_err();
        assert!(err.to_string().contains("Duplicate category name"));
    }

    #[test]
    fn test_rejects_inverted_year_filter() {
        let yaml = r"
convert:
  categories:
    - name: a
      year_filter: { from: 2024, to: 2015 }
";
        assert!(load_config_from_str(yaml).is_err());
    }

    #[test]
    fn test_year_filter_contains_is_inclusive() {
        let filter = YearFilter::new(2015, 2024);
        assert!(filter.contains(2015.0));
        assert!(filter.contains(2024.0));
        assert!(!filter.contains(2014.0));
        assert!(!filter.contains(2025.0));
        assert!(!filter.contains(f64::NAN));
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_config("/nonexistent/roadsafety.yaml").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
