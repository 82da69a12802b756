use std::fs::File;
use std::sync::Arc;

use arrow_array::cast::AsArray;
use arrow_array::types::Int32Type;
use arrow_array::{ArrayRef, DictionaryArray, Int64Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use assert_cmd::Command;
use parquet::arrow::ArrowWriter;
use tempfile::NamedTempFile;

fn write_sample_parquet() -> NamedTempFile {
    let schema = Arc::new(Schema::new(vec![Field::new("a", DataType::Int64, false)]));
    let array: ArrayRef = Arc::new(Int64Array::from(vec![1, 2, 3]));
    let batch = RecordBatch::try_new(schema.clone(), vec![array]).unwrap();

    let file = NamedTempFile::new().unwrap();
    let mut writer = ArrowWriter::try_new(File::create(file.path()).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    file
}

#[test]
fn converts_parquet_to_arrow_ipc() {
    let input = write_sample_parquet();
    let output = NamedTempFile::new().unwrap();

    Command::cargo_bin("parquet-to-arrow")
        .unwrap()
        .arg(input.path())
        .arg(output.path())
        .assert()
        .success()
        .stdout("")
        .stderr("");

    assert!(std::fs::metadata(output.path()).unwrap().len() > 0);
}

/// Each row group carries its own dictionary for the same column (a
/// realistic case for categorical data appended over time); the Arrow IPC
/// file writer can't tolerate the dictionary changing mid-file, so
/// `parquet-to-arrow` must unify them before writing rather than failing.
#[test]
fn preserves_dictionaries_that_differ_across_row_groups() {
    let schema = Arc::new(Schema::new(vec![Field::new(
        "cat",
        DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8)),
        true,
    )]));

    let dict_a: DictionaryArray<Int32Type> =
        vec![Some("red"), Some("green"), Some("red")].into_iter().collect();
    let dict_b: DictionaryArray<Int32Type> =
        vec![Some("blue"), Some("yellow"), Some("blue")].into_iter().collect();

    let batch_a = RecordBatch::try_new(schema.clone(), vec![Arc::new(dict_a) as ArrayRef]).unwrap();
    let batch_b = RecordBatch::try_new(schema.clone(), vec![Arc::new(dict_b) as ArrayRef]).unwrap();

    let input = NamedTempFile::new().unwrap();
    let mut writer = ArrowWriter::try_new(File::create(input.path()).unwrap(), schema, None).unwrap();
    writer.write(&batch_a).unwrap();
    writer.flush().unwrap();
    writer.write(&batch_b).unwrap();
    writer.flush().unwrap();
    writer.close().unwrap();

    let output = NamedTempFile::new().unwrap();
    Command::cargo_bin("parquet-to-arrow")
        .unwrap()
        .arg(input.path())
        .arg(output.path())
        .assert()
        .success()
        .stdout("")
        .stderr("");

    let reader = arrow::ipc::reader::FileReader::try_new(File::open(output.path()).unwrap(), None).unwrap();
    let mut values: Vec<String> = Vec::new();
    for batch in reader {
        let batch = batch.unwrap();
        let col = batch.column(0).as_dictionary::<Int32Type>();
        let decoded = arrow::compute::cast(col.values(), &DataType::Utf8).unwrap();
        let strings = decoded.as_string::<i32>();
        for key in col.keys() {
            values.push(strings.value(key.unwrap() as usize).to_string());
        }
    }
    assert_eq!(values, vec!["red", "green", "red", "blue", "yellow", "blue"]);
}

#[test]
fn reports_invalid_parquet_file() {
    let mut input = NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut input, b"not a parquet file").unwrap();
    let output = NamedTempFile::new().unwrap();

    Command::cargo_bin("parquet-to-arrow")
        .unwrap()
        .arg(input.path())
        .arg(output.path())
        .assert()
        .failure()
        .code(1)
        .stderr(
            "Invalid: Parquet magic bytes not found in footer. Either the file is corrupted or this is not a parquet file.\n",
        )
        .stdout("");
}
