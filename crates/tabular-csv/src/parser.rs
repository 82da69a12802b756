use std::io::Read;

use tabular_core::table::RaggedTable;
use tabular_core::Result;

use crate::diagnostics::{
    Diagnostics, Repair, SkippedColumns, SkippedRows, TruncatedValues,
};

/// Knobs for [`parse`], mirroring the `csv-to-arrow` CLI flags of
/// spec.md §6.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub max_rows: Option<usize>,
    pub max_columns: Option<usize>,
    pub max_bytes_per_value: Option<usize>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            max_rows: None,
            max_columns: None,
            max_bytes_per_value: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Start of a field: nothing decided yet about quoting.
    FieldStart,
    /// Building an unquoted value; a bare `"` here is literal content.
    Unquoted,
    /// Inside a quoted value; everything but `"` is literal, including
    /// delimiters and line breaks.
    Quoted,
    /// Just saw a `"` while quoted. The next byte decides whether it
    /// was an escaped quote, a proper close, or a misplaced quote.
    QuoteInQuoted,
    /// Past a misplaced quotation mark: the rest of the field is taken
    /// literally, including any further `"` bytes, until the next
    /// delimiter or line break.
    Repair,
}

/// Per-row bookkeeping, committed to the running [`Diagnostics`] only
/// if the row survives the `max_rows` cap.
#[derive(Debug, Default)]
struct RowEvents {
    truncated_columns: Vec<usize>,
    misplaced_column: Option<usize>,
}

/// Parse `reader` as delimiter-separated text into a [`RaggedTable`],
/// applying the caps and repairs of spec.md §4.1.
///
/// Column index 0 is the leftmost field of each row; row index 0 is
/// the first row of the input (there is no implicit header handling
/// here — callers decide whether row 0 is a header).
pub fn parse<R: Read>(mut reader: R, opts: &CsvOptions) -> Result<(RaggedTable, Diagnostics)> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;

    let mut table = RaggedTable::new();
    let mut diagnostics = Diagnostics::default();

    let mut state = State::FieldStart;
    let mut value: Vec<u8> = Vec::new();
    let mut value_truncated = false;
    let mut row: Vec<Option<Vec<u8>>> = Vec::new();
    let mut row_events = RowEvents::default();
    let mut row_index = 0usize;
    let mut skipped_rows = 0usize;
    // Set when `\r` was just consumed as a line terminator, so a
    // following `\n` is swallowed rather than starting a blank row.
    let mut swallow_lf = false;

    let is_row_capped = |table: &RaggedTable, opts: &CsvOptions| {
        matches!(opts.max_rows, Some(limit) if table.num_rows() >= limit)
    };

    let mut push_byte = |value: &mut Vec<u8>, truncated: &mut bool, byte: u8, opts: &CsvOptions| {
        match opts.max_bytes_per_value {
            Some(limit) if value.len() >= limit => *truncated = true,
            _ => value.push(byte),
        }
    };

    // Every field the byte stream actually produces — whether quoted or
    // not, empty or not — is a present value, not a null. Nulls only
    // ever come from `RaggedTable`'s backfill/forward-fill of columns a
    // given row never reached (see `test_empty_values` below).
    let mut finish_field = |value: &mut Vec<u8>,
                             value_truncated: &mut bool,
                             row: &mut Vec<Option<Vec<u8>>>,
                             row_events: &mut RowEvents| {
        let taken = std::mem::take(value);
        if *value_truncated {
            row_events.truncated_columns.push(row.len());
            *value_truncated = false;
        }
        row.push(Some(taken));
    };

    let mut finish_row = |table: &mut RaggedTable,
                           row: &mut Vec<Option<Vec<u8>>>,
                           row_events: &mut RowEvents,
                           diagnostics: &mut Diagnostics,
                           row_index: usize,
                           skipped_rows: &mut usize,
                           opts: &CsvOptions| {
        if row.is_empty() {
            // A genuinely blank line: no fields were ever completed.
            return;
        }
        if is_row_capped(table, opts) {
            *skipped_rows += 1;
        } else {
            for &column in &row_events.truncated_columns {
                let limit = opts.max_bytes_per_value.unwrap_or(0);
                diagnostics
                    .truncated_values
                    .get_or_insert(TruncatedValues {
                        count: 0,
                        limit,
                        row: row_index,
                        column,
                    })
                    .count += 1;
            }
            if let Some(column) = row_events.misplaced_column {
                match diagnostics.repaired.get_or_insert(Repair::Misplaced {
                    count: 0,
                    row: row_index,
                    column,
                }) {
                    Repair::Misplaced { count, .. } => *count += 1,
                    Repair::MissingEndQuote => {}
                }
            }
            table.push_row(std::mem::take(row));
        }
        row.clear();
        *row_events = RowEvents::default();
    };

    let mut i = 0usize;
    while i < input.len() {
        let byte = input[i];
        i += 1;

        if swallow_lf {
            swallow_lf = false;
            if byte == b'\n' {
                continue;
            }
        }

        let is_delim = byte == opts.delimiter;
        let is_cr = byte == b'\r';
        let is_lf = byte == b'\n';
        let is_terminator = is_cr || is_lf;

        match state {
            State::FieldStart => {
                if is_delim {
                    // An empty unquoted field was reached, not skipped.
                    row.push(Some(Vec::new()));
                } else if is_terminator {
                    if is_cr {
                        swallow_lf = true;
                    }
                    if !row.is_empty() {
                        row.push(Some(Vec::new()));
                    }
                    finish_row(
                        &mut table,
                        &mut row,
                        &mut row_events,
                        &mut diagnostics,
                        row_index,
                        &mut skipped_rows,
                        opts,
                    );
                    row_index += 1;
                } else if byte == b'"' {
                    state = State::Quoted;
                } else {
                    push_byte(&mut value, &mut value_truncated, byte, opts);
                    state = State::Unquoted;
                }
            }
            State::Unquoted => {
                if is_delim {
                    finish_field(&mut value, &mut value_truncated, &mut row, &mut row_events);
                    state = State::FieldStart;
                } else if is_terminator {
                    if is_cr {
                        swallow_lf = true;
                    }
                    finish_field(&mut value, &mut value_truncated, &mut row, &mut row_events);
                    finish_row(
                        &mut table,
                        &mut row,
                        &mut row_events,
                        &mut diagnostics,
                        row_index,
                        &mut skipped_rows,
                        opts,
                    );
                    row_index += 1;
                    state = State::FieldStart;
                } else {
                    push_byte(&mut value, &mut value_truncated, byte, opts);
                }
            }
            State::Quoted => {
                if byte == b'"' {
                    state = State::QuoteInQuoted;
                } else {
                    push_byte(&mut value, &mut value_truncated, byte, opts);
                }
            }
            State::QuoteInQuoted => {
                if byte == b'"' {
                    push_byte(&mut value, &mut value_truncated, byte, opts);
                    state = State::Quoted;
                } else if is_delim {
                    finish_field(&mut value, &mut value_truncated, &mut row, &mut row_events);
                    state = State::FieldStart;
                } else if is_terminator {
                    if is_cr {
                        swallow_lf = true;
                    }
                    finish_field(&mut value, &mut value_truncated, &mut row, &mut row_events);
                    finish_row(
                        &mut table,
                        &mut row,
                        &mut row_events,
                        &mut diagnostics,
                        row_index,
                        &mut skipped_rows,
                        opts,
                    );
                    row_index += 1;
                    state = State::FieldStart;
                } else {
                    // A misplaced quotation mark: the close we just saw
                    // was not actually the end of the value. The rest
                    // of the field is taken literally from here on.
                    if row_events.misplaced_column.is_none() {
                        row_events.misplaced_column = Some(row.len());
                    }
                    push_byte(&mut value, &mut value_truncated, byte, opts);
                    state = State::Repair;
                }
            }
            State::Repair => {
                if is_delim {
                    finish_field(&mut value, &mut value_truncated, &mut row, &mut row_events);
                    state = State::FieldStart;
                } else if is_terminator {
                    if is_cr {
                        swallow_lf = true;
                    }
                    finish_field(&mut value, &mut value_truncated, &mut row, &mut row_events);
                    finish_row(
                        &mut table,
                        &mut row,
                        &mut row_events,
                        &mut diagnostics,
                        row_index,
                        &mut skipped_rows,
                        opts,
                    );
                    row_index += 1;
                    state = State::FieldStart;
                } else {
                    push_byte(&mut value, &mut value_truncated, byte, opts);
                }
            }
        }
    }

    // EOF: flush whatever is pending.
    let mut missing_end_quote = false;
    match state {
        State::FieldStart => {
            if !row.is_empty() {
                row.push(Some(Vec::new()));
                finish_row(
                    &mut table,
                    &mut row,
                    &mut row_events,
                    &mut diagnostics,
                    row_index,
                    &mut skipped_rows,
                    opts,
                );
            }
        }
        State::Unquoted | State::QuoteInQuoted | State::Repair => {
            finish_field(&mut value, &mut value_truncated, &mut row, &mut row_events);
            finish_row(
                &mut table,
                &mut row,
                &mut row_events,
                &mut diagnostics,
                row_index,
                &mut skipped_rows,
                opts,
            );
        }
        State::Quoted => {
            missing_end_quote = true;
            finish_field(&mut value, &mut value_truncated, &mut row, &mut row_events);
            finish_row(
                &mut table,
                &mut row,
                &mut row_events,
                &mut diagnostics,
                row_index,
                &mut skipped_rows,
                opts,
            );
        }
    }

    if missing_end_quote && diagnostics.repaired.is_none() {
        diagnostics.repaired = Some(Repair::MissingEndQuote);
    }

    if skipped_rows > 0 {
        diagnostics.skipped_rows = Some(SkippedRows {
            count: skipped_rows,
            limit: opts.max_rows.unwrap_or(0),
        });
    }

    if let Some(max_columns) = opts.max_columns {
        let observed = table.num_columns();
        if observed > max_columns {
            table.truncate_columns(max_columns);
            diagnostics.skipped_columns = Some(SkippedColumns {
                count: observed - max_columns,
                limit: max_columns,
            });
        }
    }

    Ok((table, diagnostics))
}
