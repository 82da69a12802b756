use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tabular_parquet::{diff, is_invalid_parquet, INVALID_PARQUET_MESSAGE};

/// Compare two Parquet files structurally and by value, reporting only the
/// first disagreement found.
#[derive(Parser)]
#[command(name = "parquet-diff", version)]
struct Cli {
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short = 'q', long)]
    quiet: bool,

    a: PathBuf,
    b: PathBuf,
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

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match diff(&cli.a, &cli.b) {
        Ok(outcome) if outcome.equal => ExitCode::SUCCESS,
        Ok(outcome) => {
            print!("{}", outcome.message);
            ExitCode::FAILURE
        }
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
