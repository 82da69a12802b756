//! Parquet-side plumbing shared by the `parquet-to-*` binaries: a reader
//! adapter that yields dictionary-safe sub-batches (spec.md §4.3), and the
//! structural/value comparison engine behind `parquet-diff` (spec.md §4.5).

pub mod diff;
pub mod dictionary;
pub mod reader;

pub use diff::{diff, DiffOutcome};
pub use dictionary::DictionaryUnifier;
pub use reader::{is_invalid_parquet, ParquetSource, DICTIONARY_SUB_BATCH_ROWS, INVALID_PARQUET_MESSAGE};
