//! Shared building blocks for the `tabular-tools` binaries: the ragged
//! column model CSV parsing grows into (spec.md §3), range parsing for
//! `--column-range`/`--row-range`, and the error type every other
//! `tabular-*` crate returns.

pub mod error;
pub mod range;
pub mod table;

pub use error::{Result, TabularError};
pub use range::Range;
pub use table::RaggedTable;
