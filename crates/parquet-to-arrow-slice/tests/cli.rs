use std::fs::File;
use std::sync::Arc;

use arrow_array::{ArrayRef, Int64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use assert_cmd::Command;
use parquet::arrow::ArrowWriter;
use tempfile::NamedTempFile;

fn write_sample_parquet() -> NamedTempFile {
    let schema = Arc::new(Schema::new(vec![
        Field::new("a", DataType::Int64, false),
        Field::new("b", DataType::Utf8, false),
        Field::new("c", DataType::Int64, false),
    ]));
    let a: ArrayRef = Arc::new(Int64Array::from(vec![1, 2, 3, 4]));
    let b: ArrayRef = Arc::new(StringArray::from(vec!["w", "x", "y", "z"]));
    let c: ArrayRef = Arc::new(Int64Array::from(vec![10, 20, 30, 40]));
    let batch = RecordBatch::try_new(schema.clone(), vec![a, b, c]).unwrap();

    let file = NamedTempFile::new().unwrap();
    let mut writer = ArrowWriter::try_new(File::create(file.path()).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    file
}

#[test]
fn slices_columns_and_rows() {
    let input = write_sample_parquet();
    let output = NamedTempFile::new().unwrap();

    Command::cargo_bin("parquet-to-arrow-slice")
        .unwrap()
        .arg(input.path())
        .arg("0-2")
        .arg("1-3")
        .arg(output.path())
        .assert()
        .success()
        .stdout("")
        .stderr("");

    assert!(std::fs::metadata(output.path()).unwrap().len() > 0);
}

#[test]
fn rejects_bad_range_syntax() {
    let input = write_sample_parquet();
    let output = NamedTempFile::new().unwrap();

    Command::cargo_bin("parquet-to-arrow-slice")
        .unwrap()
        .arg(input.path())
        .arg("not-a-range")
        .arg("0-1")
        .arg(output.path())
        .assert()
        .failure();
}
