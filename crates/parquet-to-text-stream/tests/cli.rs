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
    ]));
    let a: ArrayRef = Arc::new(Int64Array::from(vec![1, 2, 3]));
    let b: ArrayRef = Arc::new(StringArray::from(vec!["x", "y", "z"]));
    let batch = RecordBatch::try_new(schema.clone(), vec![a, b]).unwrap();

    let file = NamedTempFile::new().unwrap();
    let mut writer = ArrowWriter::try_new(File::create(file.path()).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    file
}

#[test]
fn emits_csv_with_header_and_no_trailing_newline() {
    let input = write_sample_parquet();

    Command::cargo_bin("parquet-to-text-stream")
        .unwrap()
        .arg(input.path())
        .arg("csv")
        .assert()
        .success()
        .stdout("a,b\n1,x\n2,y\n3,z")
        .stderr("");
}

#[test]
fn emits_compact_json_array() {
    let input = write_sample_parquet();

    Command::cargo_bin("parquet-to-text-stream")
        .unwrap()
        .arg(input.path())
        .arg("json")
        .assert()
        .success()
        .stdout(r#"[{"a":1,"b":"x"},{"a":2,"b":"y"},{"a":3,"b":"z"}]"#)
        .stderr("");
}

#[test]
fn applies_row_range() {
    let input = write_sample_parquet();

    Command::cargo_bin("parquet-to-text-stream")
        .unwrap()
        .arg(input.path())
        .arg("csv")
        .arg("--row-range")
        .arg("1-2")
        .assert()
        .success()
        .stdout("a,b\n2,y");
}
