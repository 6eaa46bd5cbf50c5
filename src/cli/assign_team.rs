//! Team mapping writes.

use tallyman::config::TeamAssignment;
use tallyman::telemetry::StderrJsonlTelemetrySink;
use tallyman::{IngestError, PullRequestStore, TallymanConfig};
use tracing::info;

/// Maps the `--assign-team` user to their team, replacing any earlier
/// mapping. Pending migrations are applied first.
///
/// # Errors
///
/// Returns [`IngestError::Configuration`] when the assignment is malformed
/// or the database URL is blank, and [`IngestError::Store`] when the write
/// fails.
pub fn run(config: &TallymanConfig) -> Result<(), IngestError> {
    let TeamAssignment { username, team } = config.team_assignment()?;
    let store = PullRequestStore::open_migrated(&config.database_url, &StderrJsonlTelemetrySink)?;
    store.upsert_team_mapping(&username, &team)?;
    info!(%username, %team, "team mapping recorded");
    Ok(())
}
