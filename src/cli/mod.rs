//! CLI operation mode handlers.
//!
//! This module contains the implementations for different operation modes:
//! - [`migrations`]: Database schema migrations
//! - [`assign_team`]: Record a username to team mapping
//! - [`report`]: Print aggregate counts as JSON
//! - [`ingest`]: Walk a repository's pull requests into the store
//!
//! Logging setup is in [`logging`] and output formatting in [`output`].

use tallyman::{IngestError, IngestionFailure};
use thiserror::Error;

pub mod assign_team;
pub mod ingest;
pub mod logging;
pub mod migrations;
pub mod output;
pub mod report;

/// Everything a CLI mode can fail with.
#[derive(Debug, Error)]
pub enum CliError {
    /// The mode failed before any ingestion started.
    #[error(transparent)]
    Setup(#[from] IngestError),
    /// An ingestion run stopped early; its partial totals are kept.
    #[error(transparent)]
    Ingestion(#[from] IngestionFailure),
}
