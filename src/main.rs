//! tallyman CLI entrypoint for pull request ingestion and reporting.

mod cli;

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use tallyman::{IngestError, OperationMode, TallymanConfig};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use cli::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    cli::logging::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), CliError> {
    let config = load_config()?;

    match config.operation_mode() {
        OperationMode::MigrateOnly => cli::migrations::run(&config)?,
        OperationMode::AssignTeam => cli::assign_team::run(&config)?,
        OperationMode::Report => cli::report::run(&config)?,
        OperationMode::Ingest => {
            let cancel = CancellationToken::new();
            cancel_on_interrupt(cancel.clone());
            let report = cli::ingest::run(&config, cancel).await?;
            info!("Total rows inserted: {}", report.inserted);
        }
    }
    Ok(())
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`IngestError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<TallymanConfig, IngestError> {
    TallymanConfig::load().map_err(|error| IngestError::Configuration {
        message: error.to_string(),
    })
}

fn cancel_on_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping at the next page boundary");
            cancel.cancel();
        }
    });
}
