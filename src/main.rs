use clap::Parser;
use std::fs::File;
use std::sync::Mutex;
use tracing::Level;
use weather_extractor::cli::{run, Cli};
use weather_extractor::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    run(cli)
}

fn init_logging(cli: &Cli) -> Result<()> {
    let level = log_level(cli.verbose);

    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

fn log_level(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}
