use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn write_csv(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

#[test]
fn converts_backfill_csv_with_empty_stdout() {
    let input = write_csv("1\n2\n3,x\n4,x,y,z\n");
    let output = NamedTempFile::new().unwrap();

    Command::cargo_bin("csv-to-arrow")
        .unwrap()
        .arg(input.path())
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn reports_misplaced_quote_repair_on_stdout() {
    let input = write_csv("a,\"quoted\"cru\"ft\n\"\"x,d\n");
    let output = NamedTempFile::new().unwrap();

    Command::cargo_bin("csv-to-arrow")
        .unwrap()
        .arg(input.path())
        .arg(output.path())
        .assert()
        .success()
        .stdout(
            "repaired 2 values (misplaced quotation marks; see row 0 column 1)\n",
        )
        .stderr(predicate::str::is_empty());
}

#[test]
fn rejects_multi_byte_delimiter() {
    let input = write_csv("a,b\n");
    let output = NamedTempFile::new().unwrap();

    Command::cargo_bin("csv-to-arrow")
        .unwrap()
        .arg("--delimiter")
        .arg("ab")
        .arg(input.path())
        .arg(output.path())
        .assert()
        .failure();
}

#[test]
fn respects_max_rows_cap() {
    let input = write_csv("1\n2\n3\n");
    let output = NamedTempFile::new().unwrap();

    Command::cargo_bin("csv-to-arrow")
        .unwrap()
        .arg("--max-rows")
        .arg("1")
        .arg(input.path())
        .arg(output.path())
        .assert()
        .success()
        .stdout("skipped 2 rows (after row limit of 1)\n");
}
