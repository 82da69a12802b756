//! Cross-row-group dictionary unification for `parquet-to-arrow`
//! (spec.md §4.3/§8's "preserves dictionary encoding" law).
//!
//! The [`DICTIONARY_SUB_BATCH_ROWS`](crate::DICTIONARY_SUB_BATCH_ROWS) rule
//! fixes arrow-rs's dictionary-unification panic on the *read* side, but it
//! does nothing for a separate restriction on the *write* side: the Arrow
//! IPC file writer errors out ("Dictionary replacement detected...") the
//! moment a dictionary-encoded field's dictionary changes mid-file, and
//! nothing stops a Parquet file's row groups from carrying independent
//! dictionaries for the same column. [`DictionaryUnifier`] pre-scans every
//! row group's distinct dictionary values once, then re-keys each batch
//! against the combined dictionary before it reaches the writer, so the
//! file writer only ever sees one dictionary per column.

use std::collections::HashMap;
use std::sync::Arc;

use arrow_array::builder::PrimitiveBuilder;
use arrow_array::cast::AsArray;
use arrow_array::types::{Int16Type, Int32Type, Int64Type, Int8Type};
use arrow_array::{Array, ArrayRef, DictionaryArray, RecordBatch, StringArray};
use arrow_schema::{DataType, SchemaRef};

use tabular_core::Result;
use tabular_text::decode_dictionary_to_utf8;

use crate::reader::ParquetSource;

fn dictionary_columns(schema: &SchemaRef) -> Vec<usize> {
    schema
        .fields()
        .iter()
        .enumerate()
        .filter_map(|(i, f)| matches!(f.data_type(), DataType::Dictionary(_, _)).then_some(i))
        .collect()
}

/// A file-wide dictionary per dictionary-encoded column. Empty (and free
/// to build and to apply) for files with no dictionary-encoded columns,
/// which is the common case.
pub struct DictionaryUnifier {
    columns: HashMap<usize, (Arc<StringArray>, HashMap<String, i32>)>,
}

impl DictionaryUnifier {
    /// Scan every row group of `source` once, collecting each dictionary
    /// column's distinct values in order of first appearance across the
    /// whole file. Only the distinct values are retained, not the rows, so
    /// this stays cheap for the low-cardinality columns dictionaries exist
    /// for in the first place.
    pub fn build(source: &ParquetSource, schema: &SchemaRef) -> Result<Self> {
        let target_columns = dictionary_columns(schema);
        if target_columns.is_empty() {
            return Ok(Self { columns: HashMap::new() });
        }

        let mut ordered: HashMap<usize, Vec<String>> =
            target_columns.iter().map(|&c| (c, Vec::new())).collect();
        let mut index: HashMap<usize, HashMap<String, i32>> =
            target_columns.iter().map(|&c| (c, HashMap::new())).collect();

        for batch in source.batches()? {
            let batch = batch?;
            for &c in &target_columns {
                let decoded = decode_dictionary_to_utf8(batch.column(c))?;
                let strings = decoded.as_string::<i32>();
                for i in 0..strings.len() {
                    if strings.is_null(i) {
                        continue;
                    }
                    let value = strings.value(i);
                    let keys = index.get_mut(&c).unwrap();
                    if !keys.contains_key(value) {
                        let next_key = keys.len() as i32;
                        keys.insert(value.to_string(), next_key);
                        ordered.get_mut(&c).unwrap().push(value.to_string());
                    }
                }
            }
        }

        let columns = target_columns
            .into_iter()
            .map(|c| {
                let values = Arc::new(StringArray::from_iter_values(ordered.remove(&c).unwrap()));
                let value_to_key = index.remove(&c).unwrap();
                (c, (values, value_to_key))
            })
            .collect();

        Ok(Self { columns })
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Re-key `batch`'s dictionary columns against the unified dictionaries
    /// built by [`Self::build`]. A no-op when there are none.
    pub fn rekey(&self, batch: RecordBatch, schema: &SchemaRef) -> Result<RecordBatch> {
        if self.columns.is_empty() {
            return Ok(batch);
        }
        let mut columns = batch.columns().to_vec();
        for (&c, (values, value_to_key)) in &self.columns {
            let key_type = match schema.field(c).data_type() {
                DataType::Dictionary(key_type, _) => key_type.as_ref().clone(),
                other => panic!("column {c} lost its dictionary type ({other:?}) between schema and batch"),
            };
            columns[c] = rekey_dictionary_column(&columns[c], &key_type, values, value_to_key)?;
        }
        Ok(RecordBatch::try_new(batch.schema(), columns)?)
    }
}

fn rekey_dictionary_column(
    array: &ArrayRef,
    key_type: &DataType,
    unified_values: &Arc<StringArray>,
    value_to_key: &HashMap<String, i32>,
) -> Result<ArrayRef> {
    let decoded = decode_dictionary_to_utf8(array)?;
    let strings = decoded.as_string::<i32>();

    macro_rules! build_keys {
        ($ty:ty) => {{
            let mut keys = PrimitiveBuilder::<$ty>::with_capacity(strings.len());
            for i in 0..strings.len() {
                if strings.is_null(i) {
                    keys.append_null();
                } else {
                    let key = value_to_key[strings.value(i)];
                    keys.append_value(key as _);
                }
            }
            DictionaryArray::try_new(keys.finish(), unified_values.clone())?
        }};
    }

    let array: ArrayRef = match key_type {
        DataType::Int8 => Arc::new(build_keys!(Int8Type)),
        DataType::Int16 => Arc::new(build_keys!(Int16Type)),
        DataType::Int32 => Arc::new(build_keys!(Int32Type)),
        DataType::Int64 => Arc::new(build_keys!(Int64Type)),
        other => panic!("unsupported dictionary key type in parquet-to-arrow: {other:?}"),
    };
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_dictionary_columns_means_no_work() {
        let schema = Arc::new(arrow_schema::Schema::new(vec![arrow_schema::Field::new(
            "a",
            DataType::Int64,
            false,
        )]));
        assert!(dictionary_columns(&schema).is_empty());
    }
}
