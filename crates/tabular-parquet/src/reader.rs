//! The Parquet reader adapter of spec.md §4.3: open a file, read its schema,
//! and iterate row-group content in small dictionary-safe sub-batches.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow_schema::SchemaRef;
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};
use parquet::file::metadata::ParquetMetaData;

use tabular_core::{Result, TabularError};

/// Decoding a whole row group at once risks arrow-rs's "Concat with
/// dictionary unification NYI" when a row group's pages carry distinct
/// dictionaries. Reading (and rendering) in small sub-batches sidesteps
/// it entirely: each batch's dictionary is resolved and emitted before the
/// next one is read, so nothing is ever concatenated across dictionaries.
pub const DICTIONARY_SUB_BATCH_ROWS: usize = 100;

/// The exact, spec-mandated stderr line for any file that cannot be read as
/// Parquet. We normalize every parquet-open failure to this message rather
/// than passing the underlying crate's wording through, since the message
/// is pinned by the test suite independent of the toolkit that produced it.
pub const INVALID_PARQUET_MESSAGE: &str =
    "Invalid: Parquet magic bytes not found in footer. Either the file is corrupted or this is not a parquet file.";

pub struct ParquetSource {
    path: PathBuf,
    file: File,
}

impl ParquetSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| TabularError::OpenFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn builder(&self) -> Result<ParquetRecordBatchReaderBuilder<File>> {
        let file = self.file.try_clone()?;
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(Into::into)
    }

    pub fn schema(&self) -> Result<SchemaRef> {
        Ok(self.builder()?.schema().clone())
    }

    pub fn num_row_groups(&self) -> Result<usize> {
        Ok(self.builder()?.metadata().num_row_groups())
    }

    pub fn metadata(&self) -> Result<Arc<ParquetMetaData>> {
        Ok(self.builder()?.metadata().clone())
    }

    /// Rows in a single row group.
    pub fn row_group_num_rows(&self, row_group: usize) -> Result<usize> {
        Ok(self.builder()?.metadata().row_group(row_group).num_rows() as usize)
    }

    /// Iterate every batch of the file, up to [`DICTIONARY_SUB_BATCH_ROWS`]
    /// rows at a time, preserving dictionary encoding.
    pub fn batches(&self) -> Result<ParquetRecordBatchReader> {
        let reader = self
            .builder()?
            .with_batch_size(DICTIONARY_SUB_BATCH_ROWS)
            .build()?;
        Ok(reader)
    }

    /// Iterate only the batches belonging to `row_group`, used by
    /// `parquet-diff` to bound memory to one row group per file at a time
    /// (spec.md §5).
    pub fn row_group_batches(&self, row_group: usize) -> Result<ParquetRecordBatchReader> {
        let reader = self
            .builder()?
            .with_row_groups(vec![row_group])
            .with_batch_size(DICTIONARY_SUB_BATCH_ROWS)
            .build()?;
        Ok(reader)
    }
}

/// True when `err` indicates the file is not a readable Parquet file at all
/// (as opposed to e.g. a transient I/O error while reading bytes we already
/// know are Parquet). In this adapter every read failure while opening or
/// scanning the footer is treated as "not Parquet", per spec.md §4.3.
pub fn is_invalid_parquet(err: &TabularError) -> bool {
    matches!(err, TabularError::Parquet(_))
}
