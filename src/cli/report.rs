//! Aggregate report output.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use tallyman::persistence::reports::DEFAULT_DAILY_WINDOW_DAYS;
use tallyman::{IngestError, PullRequestStore, TallymanConfig};

use super::output::write_json;

/// Prints the aggregate report for the configured database as JSON.
///
/// The database must already be migrated; the report never creates tables.
///
/// # Errors
///
/// Returns [`IngestError::Configuration`] when the database URL is blank or
/// the schema is missing, [`IngestError::Store`] when a query fails and
/// [`IngestError::Io`] when stdout cannot be written.
pub fn run(config: &TallymanConfig) -> Result<(), IngestError> {
    let store = PullRequestStore::open(&config.database_url)?;
    let mut stdout = io::stdout().lock();
    write_report(&mut stdout, &store, Utc::now())
}

/// Writes the report computed at `now` to `writer`.
pub fn write_report<W: Write>(
    writer: &mut W,
    store: &PullRequestStore,
    now: DateTime<Utc>,
) -> Result<(), IngestError> {
    let summary = store.report_summary(now, DEFAULT_DAILY_WINDOW_DAYS)?;
    write_json(writer, &summary)
}
