//! Diesel-backed migration runner for the local `SQLite` database.

use diesel::Connection;
use diesel::connection::SimpleConnection;
use diesel::OptionalExtension;
use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::telemetry::{TelemetryEvent, TelemetrySink};

use super::PersistenceError;

/// Embedded Diesel migrations shipped with the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Schema version after every embedded migration has run.
pub const CURRENT_SCHEMA_VERSION: &str = "20261003000000";

/// A Diesel migration version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaVersion(String);

impl SchemaVersion {
    /// Returns the inner version string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Runs pending database migrations and records the resulting schema version
/// in telemetry.
///
/// Running against an up-to-date database is a no-op apart from the
/// telemetry event.
///
/// # Errors
///
/// Returns [`PersistenceError`] when the database cannot be opened, migrations
/// fail, or the resulting schema version cannot be read.
pub fn migrate_database(
    database_url: &str,
    telemetry: &dyn TelemetrySink,
) -> Result<SchemaVersion, PersistenceError> {
    let mut connection = establish_connection(database_url)?;
    let schema_version = run_migrations(&mut connection)?;
    telemetry.record(TelemetryEvent::SchemaVersionRecorded {
        schema_version: schema_version.as_str().to_owned(),
    });

    Ok(schema_version)
}

/// Milliseconds a statement waits on a lock held by another tallyman process
/// (for example `--assign-team` during an ingestion run).
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Opens `database_url` and applies the connection pragmas.
pub(super) fn establish_connection(
    database_url: &str,
) -> Result<SqliteConnection, PersistenceError> {
    let location = database_url.trim();
    if location.is_empty() {
        return Err(PersistenceError::BlankDatabaseUrl);
    }

    let mut connection =
        SqliteConnection::establish(location).map_err(|error| PersistenceError::ConnectionFailed {
            message: error.to_string(),
        })?;
    connection
        .batch_execute(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS};"))
        .map_err(|error| PersistenceError::PragmaFailed {
            message: error.to_string(),
        })?;

    Ok(connection)
}

/// Applies pending migrations and reports the newest applied version.
pub(super) fn run_migrations(
    connection: &mut SqliteConnection,
) -> Result<SchemaVersion, PersistenceError> {
    #[derive(Debug, QueryableByName)]
    struct Applied {
        #[diesel(sql_type = Text)]
        version: String,
    }

    connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|error| PersistenceError::MigrationFailed {
            message: error.to_string(),
        })?;

    let newest: Option<Applied> =
        sql_query("SELECT version FROM __diesel_schema_migrations ORDER BY version DESC LIMIT 1;")
            .get_result(connection)
            .optional()
            .map_err(|error| PersistenceError::SchemaVersionQueryFailed {
                message: error.to_string(),
            })?;

    newest
        .map(|applied| SchemaVersion(applied.version))
        .ok_or(PersistenceError::MissingSchemaVersion)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use super::{BUSY_TIMEOUT_MS, CURRENT_SCHEMA_VERSION, establish_connection, migrate_database};
    use crate::persistence::PersistenceError;
    use crate::telemetry::test_support::RecordingSink;
    use crate::telemetry::{NoopTelemetrySink, TelemetryEvent};

    #[rstest]
    fn migrate_database_records_schema_version_telemetry() {
        let telemetry = RecordingSink::default();

        let schema_version =
            migrate_database(":memory:", &telemetry).expect("migration should succeed");

        assert_eq!(schema_version.as_str(), CURRENT_SCHEMA_VERSION);
        assert_eq!(
            telemetry.take(),
            vec![TelemetryEvent::SchemaVersionRecorded {
                schema_version: CURRENT_SCHEMA_VERSION.to_owned(),
            }]
        );
    }

    #[rstest]
    fn connections_wait_on_locks() {
        use diesel::{QueryableByName, RunQueryDsl, sql_query, sql_types::BigInt};

        #[derive(QueryableByName)]
        struct Timeout {
            #[diesel(sql_type = BigInt)]
            timeout: i64,
        }

        let mut connection = establish_connection(":memory:").expect("connection should open");
        let setting: Timeout = sql_query("PRAGMA busy_timeout;")
            .get_result(&mut connection)
            .expect("pragma should be readable");

        assert_eq!(setting.timeout, i64::from(BUSY_TIMEOUT_MS));
    }

    #[rstest]
    fn migrating_twice_is_idempotent() {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("tallyman.sqlite");
        let database_url = db_path.to_string_lossy();

        let first = migrate_database(&database_url, &NoopTelemetrySink).expect("first run");
        let second = migrate_database(&database_url, &NoopTelemetrySink).expect("second run");

        assert_eq!(first, second);
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("   ")]
    fn blank_database_url_is_rejected(#[case] database_url: &str) {
        let result = migrate_database(database_url, &NoopTelemetrySink);

        assert_eq!(result, Err(PersistenceError::BlankDatabaseUrl));
    }
}
