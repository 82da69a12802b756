//! Renders Arrow arrays into the CSV/JSON textual forms of spec.md §4.2.
//!
//! Dictionary columns are expected to already be decoded to plain Utf8 by
//! the caller (the parquet reader adapter does this per sub-batch, per the
//! 100-row dictionary-chunking rule) — this module only needs to know how
//! to render the handful of scalar logical types.

use std::io::{self, Write};

use arrow_array::cast::AsArray;
use arrow_array::types::{
    Date32Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow_array::{Array, ArrayRef};
use arrow_schema::{ArrowError, DataType, TimeUnit as ArrowTimeUnit};

use crate::float_fmt::{format_f32, format_f64};
use crate::timestamp::{render_date32, render_timestamp, TimeUnit};

/// A single rendered cell, format-agnostic but tagged so CSV/JSON know
/// whether to quote it.
#[derive(Debug, Clone)]
pub enum Cell {
    Null,
    /// Already-decimal text: ints and finite floats. Never quoted in CSV
    /// (it can't contain a delimiter/quote/newline) and emitted bare in JSON.
    Number(String),
    /// Strings, dates and timestamps: quoted in CSV when needed, always
    /// a quoted JSON string.
    Text(String),
}

/// Render one cell of `array` at `row`. Panics on column types outside
/// spec.md §3's supported set — the caller is expected to have validated
/// the schema up front.
pub fn render_cell(array: &ArrayRef, row: usize) -> Cell {
    if array.is_null(row) {
        return Cell::Null;
    }
    match array.data_type() {
        DataType::Int8 => Cell::Number(array.as_primitive::<Int8Type>().value(row).to_string()),
        DataType::Int16 => Cell::Number(array.as_primitive::<Int16Type>().value(row).to_string()),
        DataType::Int32 => Cell::Number(array.as_primitive::<Int32Type>().value(row).to_string()),
        DataType::Int64 => Cell::Number(array.as_primitive::<Int64Type>().value(row).to_string()),
        DataType::UInt8 => Cell::Number(array.as_primitive::<UInt8Type>().value(row).to_string()),
        DataType::UInt16 => Cell::Number(array.as_primitive::<UInt16Type>().value(row).to_string()),
        DataType::UInt32 => Cell::Number(array.as_primitive::<UInt32Type>().value(row).to_string()),
        DataType::UInt64 => Cell::Number(array.as_primitive::<UInt64Type>().value(row).to_string()),
        DataType::Float32 => match format_f32(array.as_primitive::<Float32Type>().value(row)) {
            Some(s) => Cell::Number(s),
            None => Cell::Null,
        },
        DataType::Float64 => match format_f64(array.as_primitive::<Float64Type>().value(row)) {
            Some(s) => Cell::Number(s),
            None => Cell::Null,
        },
        DataType::Utf8 => Cell::Text(array.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Cell::Text(array.as_string::<i64>().value(row).to_string()),
        DataType::Date32 => {
            Cell::Text(render_date32(array.as_primitive::<Date32Type>().value(row)))
        }
        DataType::Timestamp(unit, _) => {
            let (value, tu) = match unit {
                ArrowTimeUnit::Second => (
                    array.as_primitive::<TimestampSecondType>().value(row) * 1000,
                    TimeUnit::Millisecond,
                ),
                ArrowTimeUnit::Millisecond => (
                    array.as_primitive::<TimestampMillisecondType>().value(row),
                    TimeUnit::Millisecond,
                ),
                ArrowTimeUnit::Microsecond => (
                    array.as_primitive::<TimestampMicrosecondType>().value(row),
                    TimeUnit::Microsecond,
                ),
                ArrowTimeUnit::Nanosecond => (
                    array.as_primitive::<TimestampNanosecondType>().value(row),
                    TimeUnit::Nanosecond,
                ),
            };
            Cell::Text(render_timestamp(value, tu))
        }
        other => panic!("unsupported column type for textualization: {other:?}"),
    }
}

/// Cast a dictionary-encoded column down to plain Utf8, leaving every other
/// type untouched. Used by `parquet-to-arrow-slice` and the text streamer,
/// never by `parquet-to-arrow` (which preserves dictionaries as-is).
pub fn decode_dictionary_to_utf8(array: &ArrayRef) -> Result<ArrayRef, ArrowError> {
    match array.data_type() {
        DataType::Dictionary(_, _) => arrow_cast::cast(array, &DataType::Utf8),
        _ => Ok(array.clone()),
    }
}

fn csv_needs_quoting(s: &str) -> bool {
    s.contains(['"', ',', '\n', '\r'])
}

fn csv_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn csv_field(cell: &Cell) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::Number(s) => s.clone(),
        Cell::Text(s) => {
            if csv_needs_quoting(s) {
                csv_quote(s)
            } else {
                s.clone()
            }
        }
    }
}

pub fn write_csv_header<W: Write>(w: &mut W, names: &[String]) -> io::Result<()> {
    let fields: Vec<String> = names
        .iter()
        .map(|n| csv_field(&Cell::Text(n.clone())))
        .collect();
    write!(w, "{}", fields.join(","))
}

pub fn write_csv_row<W: Write>(w: &mut W, cells: &[Cell]) -> io::Result<()> {
    let fields: Vec<String> = cells.iter().map(csv_field).collect();
    write!(w, "\n{}", fields.join(","))
}

fn json_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

fn json_value(cell: &Cell) -> String {
    match cell {
        Cell::Null => "null".to_string(),
        Cell::Number(s) => s.clone(),
        Cell::Text(s) => format!("\"{}\"", json_escape(s)),
    }
}

pub fn write_json_start<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "[")
}

pub fn write_json_row<W: Write>(
    w: &mut W,
    names: &[String],
    cells: &[Cell],
    is_first: bool,
) -> io::Result<()> {
    if !is_first {
        write!(w, ",")?;
    }
    write!(w, "{{")?;
    for (i, (name, cell)) in names.iter().zip(cells).enumerate() {
        if i > 0 {
            write!(w, ",")?;
        }
        write!(w, "\"{}\":{}", json_escape(name), json_value(cell))?;
    }
    write!(w, "}}")
}

pub fn write_json_end<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_quotes_only_when_needed() {
        assert_eq!(csv_field(&Cell::Text("plain".into())), "plain");
        assert_eq!(csv_field(&Cell::Text("a,b".into())), "\"a,b\"");
        assert_eq!(csv_field(&Cell::Text("a\"b".into())), "\"a\"\"b\"");
        assert_eq!(csv_field(&Cell::Null), "");
    }

    #[test]
    fn json_escapes_control_and_quote_characters() {
        assert_eq!(json_value(&Cell::Text("a\"b\nc".into())), "\"a\\\"b\\nc\"");
        assert_eq!(json_value(&Cell::Null), "null");
        assert_eq!(json_value(&Cell::Number("42".into())), "42");
    }

    #[test]
    fn json_passes_non_ascii_through_raw() {
        assert_eq!(json_value(&Cell::Text("Ω".into())), "\"Ω\"");
    }
}
