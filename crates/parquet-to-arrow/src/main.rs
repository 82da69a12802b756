use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use arrow::ipc::writer::FileWriter;
use clap::Parser;
use tabular_parquet::{is_invalid_parquet, DictionaryUnifier, ParquetSource, INVALID_PARQUET_MESSAGE};

/// Convert a Parquet file to an Arrow IPC file, preserving dictionary
/// encoding for columns that have it.
#[derive(Parser)]
#[command(name = "parquet-to-arrow", version)]
struct Cli {
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short = 'q', long)]
    quiet: bool,

    /// Input Parquet file.
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

fn run(cli: &Cli) -> tabular_core::Result<()> {
    let source = ParquetSource::open(&cli.input)?;
    let schema = source.schema()?;
    log::debug!("converting {} -> {}", cli.input.display(), cli.output.display());

    // Row groups may each carry their own dictionary for the same column;
    // the IPC file writer requires one dictionary for the whole file, so
    // unify them up front (a no-op scan when there's nothing to unify).
    let unifier = DictionaryUnifier::build(&source, &schema)?;
    if !unifier.is_empty() {
        log::debug!("unified dictionary columns across row groups before writing");
    }

    let output = File::create(&cli.output).map_err(|source| tabular_core::TabularError::OpenFile {
        path: cli.output.clone(),
        source,
    })?;
    let mut writer = FileWriter::try_new(output, &schema)?;

    let mut rows = 0usize;
    for batch in source.batches()? {
        let batch = unifier.rekey(batch?, &schema)?;
        rows += batch.num_rows();
        writer.write(&batch)?;
    }
    writer.finish()?;
    log::info!("wrote {rows} rows");
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
