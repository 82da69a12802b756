use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use arrow::ipc::writer::FileWriter;
use arrow_schema::{DataType, Field, Schema};
use clap::Parser;
use tabular_core::{Range, TabularError};
use tabular_parquet::{is_invalid_parquet, ParquetSource, INVALID_PARQUET_MESSAGE};
use tabular_text::decode_dictionary_to_utf8;

/// Convert a column/row slice of a Parquet file to an Arrow IPC file.
/// Dictionary columns are decoded to plain utf8 on the way out.
#[derive(Parser)]
#[command(name = "parquet-to-arrow-slice", version)]
struct Cli {
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short = 'q', long)]
    quiet: bool,

    /// Input Parquet file.
    input: PathBuf,

    /// Half-open column range `A-B`, 0-indexed.
    column_range: String,

    /// Half-open row range `A-B`, 0-indexed.
    row_range: String,

    /// Output Arrow IPC file.
    output: PathBuf,
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

fn sliced_schema(schema: &Schema, column_range: Range) -> Schema {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(i, _)| column_range.contains(*i))
        .map(|(_, field)| match field.data_type() {
            DataType::Dictionary(_, _) => {
                Field::new(field.name(), DataType::Utf8, field.is_nullable())
            }
            _ => field.as_ref().clone(),
        })
        .collect();
    Schema::new(fields)
}

fn run(cli: &Cli) -> tabular_core::Result<()> {
    let column_range: Range = cli.column_range.parse()?;
    let row_range: Range = cli.row_range.parse()?;

    let source = ParquetSource::open(&cli.input)?;
    let schema = source.schema()?;

    let column_range = column_range.clamp(schema.fields().len());
    let column_indices: Vec<usize> = (column_range.start..column_range.end).collect();

    let output_schema = Arc::new(sliced_schema(&schema, column_range));
    let output = File::create(&cli.output).map_err(|source| TabularError::OpenFile {
        path: cli.output.clone(),
        source,
    })?;
    let mut writer = FileWriter::try_new(output, &output_schema)?;

    let mut global_offset = 0usize;
    let mut rows_written = 0usize;
    for batch in source.batches()? {
        let batch = batch?;
        let len = batch.num_rows();
        let row_range = row_range.clamp(global_offset + len);
        let local_start = row_range.start.saturating_sub(global_offset).min(len);
        let local_end = row_range.end.saturating_sub(global_offset).min(len);
        global_offset += len;

        if local_end <= local_start {
            continue;
        }

        let sliced = batch.slice(local_start, local_end - local_start);
        let projected = sliced.project(&column_indices)?;
        let decoded_columns: Vec<_> = projected
            .columns()
            .iter()
            .map(decode_dictionary_to_utf8)
            .collect::<Result<_, _>>()?;
        let out_batch = arrow::record_batch::RecordBatch::try_new(output_schema.clone(), decoded_columns)?;
        rows_written += out_batch.num_rows();
        writer.write(&out_batch)?;
    }
    writer.finish()?;
    log::info!("wrote {rows_written} rows");
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
