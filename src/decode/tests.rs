//! Tests for decode module

use super::*;
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use pretty_assertions::assert_eq;
use std::io::Write;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use test_case::test_case;

fn write_csv(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn text_batch(columns: &[(&str, Vec<Option<&str>>)]) -> RecordBatch {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, _)| Field::new(*name, DataType::Utf8, true))
        .collect();
    let arrays: Vec<arrow::array::ArrayRef> = columns
        .iter()
        .map(|(_, values)| {
            Arc::new(arrow::array::StringArray::from(values.clone())) as arrow::array::ArrayRef
        })
        .collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
}

// ============================================================================
// Parsing Tests
// ============================================================================

#[test_case("42", Some(42) ; "plain integer")]
#[test_case(" 7 ", Some(7) ; "padded")]
#[test_case("-3", Some(-3) ; "negative")]
#[test_case("2015.0", Some(2015) ; "integral float")]
#[test_case("1e3", Some(1000) ; "exponent")]
#[test_case("2.5", None ; "fractional")]
#[test_case("", None ; "empty")]
#[test_case("abc", None ; "text")]
#[test_case("NaN", None ; "nan")]
#[test_case("inf", None ; "infinite")]
fn test_parse_integer(input: &str, expected: Option<i64>) {
    assert_eq!(parse_integer(input), expected);
}

#[test_case("3.25", Some(3.25) ; "decimal")]
#[test_case("10", Some(10.0) ; "integer")]
#[test_case(" -0.5", Some(-0.5) ; "padded negative")]
#[test_case("", None ; "empty")]
#[test_case("n/a", None ; "text")]
fn test_parse_float(input: &str, expected: Option<f64>) {
    assert_eq!(parse_float(input), expected);
}

// ============================================================================
// MasterSchema Tests
// ============================================================================

#[test]
fn test_master_schema_normalizes_types() {
    let inferred = Schema::new(vec![
        Field::new("id", DataType::Int64, true),
        Field::new("speed", DataType::Float64, true),
        Field::new("date", DataType::Date32, true),
        Field::new("flag", DataType::Boolean, true),
        Field::new("name", DataType::Utf8, true),
    ]);
    let schema = MasterSchema::from_inferred(&inferred);

    assert_eq!(schema.len(), 5);
    assert_eq!(schema.kind_of("id"), Some(ColumnKind::Integer));
    assert_eq!(schema.kind_of("speed"), Some(ColumnKind::Float));
    assert_eq!(schema.kind_of("date"), Some(ColumnKind::Text));
    assert_eq!(schema.kind_of("flag"), Some(ColumnKind::Text));
    assert_eq!(schema.kind_of("missing"), None);

    let text = schema.text_schema();
    assert!(text.fields().iter().all(|f| f.data_type() == &DataType::Utf8));
    assert_eq!(text.field(2).name(), "date");
}

// ============================================================================
// CsvSource Tests
// ============================================================================

#[test]
fn test_infer_master_schema() {
    let dir = tempdir().unwrap();
    let path = write_csv(
        &dir,
        "collisions.csv",
        "collision_index,collision_year,speed,road\n1,2016,30.5,A1\n2,2019,,M25\n",
    );

    let source = CsvSource::new(&path, 100);
    let schema = source.infer_master_schema().unwrap();

    let kinds: Vec<_> = schema.columns().map(|(n, k)| (n.to_string(), k)).collect();
    assert_eq!(
        kinds,
        vec![
            ("collision_index".to_string(), ColumnKind::Integer),
            ("collision_year".to_string(), ColumnKind::Integer),
            ("speed".to_string(), ColumnKind::Float),
            ("road".to_string(), ColumnKind::Text),
        ]
    );
    assert_eq!(source.stem(), "collisions");
}

#[test]
fn test_infer_uses_only_first_batch() {
    let dir = tempdir().unwrap();
    // Third row would widen `code` to text if the whole file were inspected
    let path = write_csv(&dir, "head.csv", "code\n1\n2\nX9\n");

    let head = CsvSource::new(&path, 2).infer_master_schema().unwrap();
    assert_eq!(head.kind_of("code"), Some(ColumnKind::Integer));

    let full = CsvSource::new(&path, 2).infer_full_schema().unwrap();
    assert_eq!(full.kind_of("code"), Some(ColumnKind::Text));
}

#[test]
fn test_size_bytes() {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, "sized.csv", "a\n1\n");
    assert_eq!(CsvSource::new(&path, 10).size_bytes().unwrap(), 4);

    let err = CsvSource::new(dir.path().join("gone.csv"), 10)
        .size_bytes()
        .unwrap_err();
    assert!(err.is_missing_input());
}

#[test]
fn test_infer_empty_file_fails() {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, "empty.csv", "");
    assert!(CsvSource::new(&path, 10).infer_master_schema().is_err());
}

#[test]
fn test_infer_missing_file() {
    let err = CsvSource::new("/nonexistent/file.csv", 10)
        .infer_master_schema()
        .unwrap_err();
    assert!(err.is_missing_input());
}

#[test]
fn test_text_batches_window_size() {
    let dir = tempdir().unwrap();
    let mut content = String::from("a,b\n");
    for i in 0..25 {
        content.push_str(&format!("{i},x{i}\n"));
    }
    let path = write_csv(&dir, "windows.csv", &content);

    let source = CsvSource::new(&path, 10);
    let schema = source.infer_master_schema().unwrap();
    let sizes: Vec<usize> = source
        .text_batches(&schema)
        .unwrap()
        .map(|b| b.unwrap().num_rows())
        .collect();

    assert_eq!(sizes, vec![10, 10, 5]);
}

#[test]
fn test_text_batches_are_untyped() {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, "raw.csv", "n\n007\n");

    let source = CsvSource::new(&path, 10);
    let schema = source.infer_master_schema().unwrap();
    let batch = source.text_batches(&schema).unwrap().next().unwrap().unwrap();

    assert_eq!(batch.column(0).data_type(), &DataType::Utf8);
    assert_eq!(batch.column(0).as_string::<i32>().value(0), "007");
}

// ============================================================================
// Coercion Tests
// ============================================================================

#[test]
fn test_coerce_batch_types_and_nulls() {
    let schema = MasterSchema::from_inferred(&Schema::new(vec![
        Field::new("year", DataType::Int64, true),
        Field::new("speed", DataType::Float64, true),
        Field::new("road", DataType::Utf8, true),
    ]));
    let batch = text_batch(&[
        ("year", vec![Some("2016"), Some("bad"), None]),
        ("speed", vec![Some("30"), Some("4.5"), Some("?")]),
        ("road", vec![Some("A1"), None, Some("M6")]),
    ]);

    let out = coerce_batch(&batch, &schema).unwrap();
    assert_eq!(out.schema(), schema.schema());

    let year = out.column(0).as_primitive::<Int64Type>();
    assert_eq!(year.value(0), 2016);
    assert!(year.is_null(1));
    assert!(year.is_null(2));

    let speed = out.column(1).as_primitive::<Float64Type>();
    assert_eq!(speed.value(0), 30.0);
    assert_eq!(speed.value(1), 4.5);
    assert!(speed.is_null(2));

    let road = out.column(2).as_string::<i32>();
    assert_eq!(road.value(0), "A1");
    assert!(road.is_null(1));
}

#[test]
fn test_coerce_batch_reorders_by_name() {
    let schema = MasterSchema::from_inferred(&Schema::new(vec![
        Field::new("a", DataType::Int64, true),
        Field::new("b", DataType::Utf8, true),
    ]));
    let batch = text_batch(&[("b", vec![Some("x")]), ("a", vec![Some("1")])]);

    let out = coerce_batch(&batch, &schema).unwrap();
    assert_eq!(out.schema().field(0).name(), "a");
    assert_eq!(out.column(0).as_primitive::<Int64Type>().value(0), 1);
}

#[test]
fn test_coerce_batch_missing_column_fails() {
    let schema = MasterSchema::from_inferred(&Schema::new(vec![
        Field::new("a", DataType::Int64, true),
        Field::new("b", DataType::Utf8, true),
    ]));
    let batch = text_batch(&[("a", vec![Some("1")])]);

    let err = coerce_batch(&batch, &schema).unwrap_err();
    assert!(err.to_string().contains("column 'b' missing"));
}

#[test]
fn test_read_all_text() {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, "all.csv", "a,b\n1,x\n2,\n3,z\n");

    let batch = CsvSource::new(&path, 2).read_all_text().unwrap();
    assert_eq!(batch.num_rows(), 3);
    assert_eq!(batch.column(0).data_type(), &DataType::Utf8);
    assert!(batch.column(1).is_null(1));
}
