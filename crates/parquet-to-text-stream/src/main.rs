use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tabular_core::Range;
use tabular_parquet::{is_invalid_parquet, ParquetSource, INVALID_PARQUET_MESSAGE};
use tabular_text::{decode_dictionary_to_utf8, render_cell, write_csv_header, write_csv_row, write_json_end, write_json_row, write_json_start};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

/// Stream a Parquet file to stdout as CSV or JSON, optionally restricted to
/// a column and/or row range.
#[derive(Parser)]
#[command(name = "parquet-to-text-stream", version)]
struct Cli {
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short = 'q', long)]
    quiet: bool,

    /// Input Parquet file.
    input: PathBuf,

    /// Output format.
    format: OutputFormat,

    /// Half-open column range `A-B`, 0-indexed. Defaults to all columns.
    #[arg(long = "column-range")]
    column_range: Option<String>,

    /// Half-open row range `A-B`, 0-indexed. Defaults to all rows.
    #[arg(long = "row-range")]
    row_range: Option<String>,
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn run(cli: &Cli) -> tabular_core::Result<()> {
    let column_range = match &cli.column_range {
        Some(raw) => raw.parse()?,
        None => Range::all(),
    };
    let row_range = match &cli.row_range {
        Some(raw) => raw.parse()?,
        None => Range::all(),
    };

    let source = ParquetSource::open(&cli.input)?;
    let schema = source.schema()?;

    let column_range = column_range.clamp(schema.fields().len());
    let column_indices: Vec<usize> = (column_range.start..column_range.end).collect();
    let names: Vec<String> = column_indices
        .iter()
        .map(|&i| schema.field(i).name().clone())
        .collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.format {
        OutputFormat::Csv => write_csv_header(&mut out, &names)?,
        OutputFormat::Json => write_json_start(&mut out)?,
    }

    let mut global_offset = 0usize;
    let mut rows_emitted = 0usize;
    for batch in source.batches()? {
        let batch = batch?;
        let len = batch.num_rows();
        let this_row_range = row_range.clamp(global_offset + len);
        let local_start = this_row_range.start.saturating_sub(global_offset).min(len);
        let local_end = this_row_range.end.saturating_sub(global_offset).min(len);
        global_offset += len;

        if local_end <= local_start {
            continue;
        }

        let sliced = batch.slice(local_start, local_end - local_start);
        let columns: Vec<_> = column_indices
            .iter()
            .map(|&i| decode_dictionary_to_utf8(sliced.column(i)))
            .collect::<Result<_, _>>()?;

        for row in 0..sliced.num_rows() {
            let cells: Vec<_> = columns.iter().map(|c| render_cell(c, row)).collect();
            match cli.format {
                OutputFormat::Csv => write_csv_row(&mut out, &cells)?,
                OutputFormat::Json => write_json_row(&mut out, &names, &cells, rows_emitted == 0)?,
            }
            rows_emitted += 1;
        }
    }

    if matches!(cli.format, OutputFormat::Json) {
        write_json_end(&mut out)?;
    }
    out.flush()?;
    log::info!("emitted {rows_emitted} rows");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if is_invalid_parquet(&err) => {
            eprintln!("{INVALID_PARQUET_MESSAGE}");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
