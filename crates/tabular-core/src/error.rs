use std::path::PathBuf;

use thiserror::Error;

/// The error type shared by every `tabular-*` library crate.
///
/// Binaries convert this into a process exit code and a single-line
/// message the way spec.md §7 requires: malformed input and usage
/// errors exit non-zero, recoverable parsing quirks never become an
/// `Err` at all (see `tabular_csv::Diagnostics`).
#[derive(Debug, Error)]
pub enum TabularError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Arrow(#[from] arrow_schema::ArrowError),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("invalid range {raw:?}: {reason}")]
    InvalidRange { raw: String, reason: String },

    #[error("{0}")]
    Usage(String),

    #[error("cannot open {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TabularError>;
