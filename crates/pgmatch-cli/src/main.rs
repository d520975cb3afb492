mod args;
mod config;
mod connect;
mod logging;
mod prompt;

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use clap::error::ErrorKind;
use thiserror::Error;
use tracing::{error, info};

use pgmatch_catalog::{CatalogReader, PostgresCatalog};
use pgmatch_compare::{CompareError, ComparisonEngine};
use pgmatch_core::{APPLICATION_NAME, RunConfig, Side};

use args::Cli;
use logging::{FATAL_TARGET, init_logging};

#[derive(Debug, Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("logging setup failed: {0}")]
    Logging(String),
    #[error("{0}")]
    Connection(#[from] pgmatch_core::Error),
    #[error("{0}")]
    Compare(#[from] CompareError),
    #[error("{0}")]
    Prompt(String),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match init_logging(cli.verbose, cli.log) {
        Ok(Some(path)) => info!(path = %path.display(), "logging to file"),
        Ok(None) => {}
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    }

    info!(
        "{APPLICATION_NAME}  Version {}  Compare in progress...",
        env!("CARGO_PKG_VERSION")
    );
    info!("--------- program start ----------");

    let config = match config::load(&cli) {
        Ok(config) => config,
        Err(err) => return fail(err),
    };

    match run(config).await {
        Ok(summary) => {
            info!("{summary}");
            info!("--------- program end   ----------");
            ExitCode::SUCCESS
        }
        Err(err) => fail(err),
    }
}

fn fail(err: CliError) -> ExitCode {
    error!(target: FATAL_TARGET, "{err}");
    error!("Program ended with error(s).");
    ExitCode::FAILURE
}

/// Connect both sides, run every phase, and close both connections on
/// every path out.
async fn run(config: RunConfig) -> Result<String, CliError> {
    let started = Instant::now();

    let source = connect::connect_side(&config.source, Side::Source).await?;
    let target = match connect::connect_side(&config.target, Side::Target).await {
        Ok(target) => target,
        Err(err) => {
            source.close().await;
            return Err(err);
        }
    };

    let scan_mode = config.scan_mode;
    let engine = ComparisonEngine::new(config);
    let outcome = engine.run(&source, &target).await;
    close_both(&source, &target).await;

    let report = outcome?;
    Ok(report.summary(scan_mode, started.elapsed()))
}

async fn close_both(source: &PostgresCatalog, target: &PostgresCatalog) {
    source.close().await;
    target.close().await;
}
