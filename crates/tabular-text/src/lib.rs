//! Per-type CSV/JSON rendering: integers, shortest-round-trip floats, UTC
//! timestamps and dates, and dictionary-decoded strings (spec.md §4.2).

pub mod float_fmt;
pub mod render;
pub mod timestamp;

pub use render::{
    decode_dictionary_to_utf8, render_cell, write_csv_header, write_csv_row, write_json_end,
    write_json_row, write_json_start, Cell,
};
pub use timestamp::{render_date32, render_timestamp, TimeUnit};
