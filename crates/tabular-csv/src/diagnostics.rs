use std::io::{self, Write};

/// The repair/cap summary of spec.md §4.1. Every field is independent
/// and optional; at most one line is ever written per field, always
/// in this fixed order (rows, columns, truncation, quote repair).
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    pub skipped_rows: Option<SkippedRows>,
    pub skipped_columns: Option<SkippedColumns>,
    pub truncated_values: Option<TruncatedValues>,
    pub repaired: Option<Repair>,
}

#[derive(Debug, Clone, Copy)]
pub struct SkippedRows {
    pub count: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct SkippedColumns {
    pub count: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct TruncatedValues {
    pub count: usize,
    pub limit: usize,
    pub row: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy)]
pub enum Repair {
    Misplaced {
        count: usize,
        row: usize,
        column: usize,
    },
    MissingEndQuote,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.skipped_rows.is_none()
            && self.skipped_columns.is_none()
            && self.truncated_values.is_none()
            && self.repaired.is_none()
    }

    /// Write the diagnostic lines to `w` in the fixed order spec.md
    /// §4.1 requires. This is the *only* thing `csv-to-arrow` ever
    /// writes to stdout.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        if let Some(r) = self.skipped_rows {
            writeln!(w, "skipped {} rows (after row limit of {})", r.count, r.limit)?;
        }
        if let Some(c) = self.skipped_columns {
            writeln!(
                w,
                "skipped {} columns (after column limit of {})",
                c.count, c.limit
            )?;
        }
        if let Some(t) = self.truncated_values {
            writeln!(
                w,
                "truncated {} values (value byte limit is {}; see row {} column {})",
                t.count, t.limit, t.row, t.column
            )?;
        }
        match self.repaired {
            Some(Repair::Misplaced { count, row, column }) => {
                writeln!(
                    w,
                    "repaired {count} values (misplaced quotation marks; see row {row} column {column})"
                )?;
            }
            Some(Repair::MissingEndQuote) => {
                writeln!(w, "repaired last value (missing quotation mark)")?;
            }
            None => {}
        }
        Ok(())
    }
}
