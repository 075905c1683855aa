//! Integration tests over temporary fixtures
//!
//! Tests the full end-to-end flow: YAML config → CSV sources → Parquet/CSV output

use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Int64Type};
use clap::Parser;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pretty_assertions::assert_eq;
use roadsafety_etl::cli::{Cli, Runner};
use roadsafety_etl::convert::{ConversionMethod, FileOutcome};
use roadsafety_etl::{clean_accidents, load_config_from_str, run_conversion};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn collisions_csv(first_year: i64, rows: usize) -> String {
    let mut content = String::from("collision_index,collision_year,number_of_vehicles,road\n");
    for i in 0..rows {
        let year = first_year + (i % 20) as i64;
        content.push_str(&format!("C{i:05},{year},{},A{}\n", 1 + i % 3, i % 7));
    }
    content
}

fn read_years(path: &Path) -> Vec<i64> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(path).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let mut years = Vec::new();
    for batch in reader {
        let batch = batch.unwrap();
        let column = batch.column_by_name("collision_year").unwrap();
        assert_eq!(column.data_type(), &DataType::Int64);
        years.extend(column.as_primitive::<Int64Type>().iter().flatten());
    }
    years
}

// ============================================================================
// Conversion Tests
// ============================================================================

#[test]
fn test_run_conversion_from_yaml() {
    let dir = tempdir().unwrap();
    let recent = write_file(&dir, "recent.csv", &collisions_csv(2025, 40));
    let prior = write_file(&dir, "prior.csv", &collisions_csv(2005, 200));
    let missing = dir.path().join("absent.csv");
    let output_root = dir.path().join("parquet");

    let yaml = format!(
        r"
convert:
  output_root: {root}
  batch_rows: 50
  chunked_threshold_mb: 0
  categories:
    - name: 2025_dataset
      sources:
        - {recent}
        - {missing}
    - name: 2024_prior
      sources:
        - {prior}
      year_filter:
        from: 2015
        to: 2024
",
        root = output_root.display(),
        recent = recent.display(),
        missing = missing.display(),
        prior = prior.display(),
    );
    let config = load_config_from_str(&yaml).unwrap().convert;

    let report = run_conversion(&config);

    assert_eq!(report.files.len(), 3);
    assert_eq!(report.missing(), vec![missing.as_path()]);
    assert!(report.failures().is_empty());

    let recent_files = report.category_files("2025_dataset");
    assert_eq!(recent_files.len(), 1);
    assert_eq!(recent_files[0].file_name(), "recent_part01.parquet");
    assert_eq!(read_years(&recent_files[0].path).len(), 40);

    let prior_files = report.category_files("2024_prior");
    assert_eq!(prior_files.len(), 1);
    assert!(prior_files[0]
        .path
        .starts_with(output_root.join("2024_prior")));

    let years = read_years(&prior_files[0].path);
    assert_eq!(years.len(), 100);
    assert!(years.iter().all(|y| (2015..=2024).contains(y)));

    match &report.files[2].outcome {
        FileOutcome::Converted { conversion } => {
            assert_eq!(conversion.method, ConversionMethod::Chunked);
            assert_eq!(conversion.rows_written, 100);
            assert_eq!(conversion.rows_filtered, 100);
        }
        other => panic!("Expected conversion, got {other:?}"),
    }
}

#[test]
fn test_run_conversion_small_path_ignores_year_filter() {
    let dir = tempdir().unwrap();
    let prior = write_file(&dir, "prior.csv", &collisions_csv(2005, 60));
    let output_root = dir.path().join("parquet");

    let yaml = format!(
        r"
convert:
  output_root: {root}
  categories:
    - name: 2024_prior
      sources: [{prior}]
      year_filter: {{ from: 2015, to: 2024 }}
",
        root = output_root.display(),
        prior = prior.display(),
    );
    let config = load_config_from_str(&yaml).unwrap().convert;

    let report = run_conversion(&config);
    let files = report.output_files();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name(), "prior.parquet");
    assert_eq!(read_years(&files[0].path).len(), 60);
}

#[test]
fn test_run_conversion_continues_after_failure() {
    let dir = tempdir().unwrap();
    let empty = write_file(&dir, "empty.csv", "");
    let good = write_file(&dir, "good.csv", &collisions_csv(2020, 10));

    let yaml = format!(
        r"
convert:
  output_root: {root}
  chunked_threshold_mb: 0
  categories:
    - name: mixed
      sources: [{empty}, {good}]
",
        root = dir.path().join("out").display(),
        empty = empty.display(),
        good = good.display(),
    );
    let config = load_config_from_str(&yaml).unwrap().convert;

    let report = run_conversion(&config);

    assert_eq!(report.failures().len(), 1);
    assert_eq!(report.failures()[0].0, empty.as_path());
    assert_eq!(report.total_outputs(), 1);
}

// ============================================================================
// Cleaning Tests
// ============================================================================

#[test]
fn test_clean_from_yaml() {
    let dir = tempdir().unwrap();
    let lookups = write_file(
        &dir,
        "lookups.csv",
        "table,field name,code/format,label\n\
         Accident,weather_conditions,1,Fine no high winds\n\
         Accident,weather_conditions,2,Raining no high winds\n\
         Accident,road_type,0,\n",
    );
    let accidents = write_file(
        &dir,
        "accidents.csv",
        "accident_index,weather_conditions,road_type,date,time\n\
         X1,1,0,01/02/2019,09:15\n\
         X2,2,6,13/02/2019,18:00\n",
    );
    let output = dir.path().join("cleaned.csv");

    let yaml = format!(
        r"
clean:
  accidents: {accidents}
  lookups: {lookups}
  output: {output}
  fields: [weather_conditions, road_type]
  day_first: true
",
        accidents = accidents.display(),
        lookups = lookups.display(),
        output = output.display(),
    );
    let config = load_config_from_str(&yaml).unwrap().clean;

    let summary = clean_accidents(&config).unwrap();
    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.replaced["weather_conditions"], 2);
    assert_eq!(summary.replaced["road_type"], 1);

    let written = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(
        lines,
        vec![
            "accident_index,weather_conditions,road_type,date,time,timestamp",
            "X1,Fine no high winds,None,01/02/2019,09:15,2019-02-01 09:15:00",
            "X2,Raining no high winds,6,13/02/2019,18:00,2019-02-13 18:00:00",
        ]
    );
}

// ============================================================================
// CLI Tests
// ============================================================================

#[test]
fn test_cli_convert_with_overrides() {
    let dir = tempdir().unwrap();
    let source = write_file(&dir, "collisions.csv", &collisions_csv(2010, 30));
    let config_path = write_file(
        &dir,
        "etl.yaml",
        &format!(
            "convert:\n  categories:\n    - name: adhoc\n      sources: [{}]\n",
            source.display()
        ),
    );
    let output_root = dir.path().join("cli-out");

    let cli = Cli::parse_from([
        "roadsafety-etl".to_string(),
        "-C".to_string(),
        config_path.display().to_string(),
        "--format".to_string(),
        "json".to_string(),
        "convert".to_string(),
        "--output".to_string(),
        output_root.display().to_string(),
    ]);
    Runner::new(cli).run().unwrap();

    assert!(output_root.join("adhoc/collisions.parquet").exists());
}

#[test]
fn test_cli_missing_config_file_fails() {
    let cli = Cli::parse_from(["roadsafety-etl", "-C", "/nonexistent/etl.yaml", "config"]);
    assert!(Runner::new(cli).run().is_err());
}
