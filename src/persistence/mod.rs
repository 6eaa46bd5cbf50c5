//! Durable storage for ingested pull requests.
//!
//! tallyman keeps everything in one local `SQLite` database: the
//! `pull_requests` table written by ingestion and the `team_mapping` table
//! that groups authors in reports. The schema is managed with embedded Diesel
//! migrations so a fresh database can be created with `--migrate-db`.

mod error;
mod migrator;
mod record;
pub mod reports;
mod store;

pub use error::PersistenceError;
pub use migrator::{CURRENT_SCHEMA_VERSION, SchemaVersion, migrate_database};
pub use record::{FETCHED_AT_FORMAT, PullRequestRecord};
pub use store::PullRequestStore;
