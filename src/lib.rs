//! tallyman library crate: pull request ingestion for team reporting.
//!
//! The library walks a repository's pull request listing on the GitHub REST
//! API, enriches each pull request with its comment and commit counts, and
//! records it once in a local `SQLite` database. Aggregate queries over that
//! database group authors by team for reporting.

pub mod config;
pub mod github;
pub mod ingest;
pub mod persistence;
pub mod telemetry;

pub use config::{OperationMode, TallymanConfig};
pub use github::{
    HttpPullRequestSource, IngestError, ListingState, PersonalAccessToken, PullRequestSource,
    PullRequestSummary, RepositoryLocator,
};
pub use ingest::{Ingestion, IngestionFailure, IngestionReport};
pub use persistence::{PersistenceError, PullRequestRecord, PullRequestStore};
