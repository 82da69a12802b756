use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context};
use arrow::ipc::writer::FileWriter;
use clap::Parser;
use tabular_csv::CsvOptions;

/// Convert a CSV file to an Arrow IPC file, repairing malformed quoting and
/// growing columns on the fly rather than failing on ragged input.
#[derive(Parser)]
#[command(name = "csv-to-arrow", version)]
struct Cli {
    /// Field delimiter, exactly one byte. Defaults to a comma.
    #[arg(long)]
    delimiter: Option<String>,

    /// Drop rows beyond this count; reported on stdout at the end of the run.
    #[arg(long = "max-rows")]
    max_rows: Option<usize>,

    /// Drop columns beyond this count; reported on stdout at the end of the run.
    #[arg(long = "max-columns")]
    max_columns: Option<usize>,

    /// Truncate values longer than this many bytes; reported on stdout.
    #[arg(long = "max-bytes-per-value")]
    max_bytes_per_value: Option<usize>,

    /// Verbose mode (-v, -vv, -vvv for info/debug/trace logging).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors.
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Input CSV file.
    input: PathBuf,

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

fn parse_delimiter(raw: &str) -> anyhow::Result<u8> {
    let bytes = raw.as_bytes();
    if bytes.len() != 1 {
        bail!("--delimiter must be exactly one byte, got {raw:?}");
    }
    Ok(bytes[0])
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let delimiter = match &cli.delimiter {
        Some(raw) => parse_delimiter(raw)?,
        None => b',',
    };

    let opts = CsvOptions {
        delimiter,
        max_rows: cli.max_rows,
        max_columns: cli.max_columns,
        max_bytes_per_value: cli.max_bytes_per_value,
    };

    log::debug!("reading {}", cli.input.display());
    let input = BufReader::new(
        File::open(&cli.input).with_context(|| format!("cannot open {}", cli.input.display()))?,
    );

    let (table, diagnostics) = tabular_csv::parse(input, &opts)?;
    log::info!(
        "parsed {} rows, {} columns",
        table.num_rows(),
        table.num_columns()
    );

    let batch = table.to_record_batch()?;
    let schema = batch.schema();

    let output = File::create(&cli.output)
        .with_context(|| format!("cannot create {}", cli.output.display()))?;
    let mut writer = FileWriter::try_new(output, &schema)?;
    writer.write(&batch)?;
    writer.finish()?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    diagnostics.write_to(&mut handle)?;

    Ok(())
}
