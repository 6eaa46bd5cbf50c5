//! The durable pull request store.
//!
//! A [`PullRequestStore`] owns one `SQLite` connection for its lifetime and
//! is handed to the ingestion pipeline and the report queries by reference.
//! Pull request writes are first-write-wins: `pr_id` is the primary key and a
//! conflicting insert is silently skipped, so re-running ingestion never
//! rewrites history. Team mappings are last-write-wins.

use std::fmt;
use std::sync::Mutex;

use diesel::OptionalExtension;
use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Bool, Nullable, Text};
use diesel::sqlite::SqliteConnection;

use crate::telemetry::{TelemetryEvent, TelemetrySink};

use super::PersistenceError;
use super::migrator::{establish_connection, run_migrations};
use super::record::PullRequestRecord;

pub(super) const PULL_REQUESTS_TABLE: &str = "pull_requests";
pub(super) const TEAM_MAPPING_TABLE: &str = "team_mapping";

/// SQLite-backed store for pull request records and team mappings.
pub struct PullRequestStore {
    connection: Mutex<SqliteConnection>,
}

impl fmt::Debug for PullRequestStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PullRequestStore").finish_non_exhaustive()
    }
}

#[derive(Debug, QueryableByName)]
pub(super) struct RecordRow {
    #[diesel(sql_type = BigInt)]
    pr_id: i64,
    #[diesel(sql_type = Nullable<Text>)]
    pr_url: Option<String>,
    #[diesel(sql_type = Text)]
    repo_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    author: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pr_status: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    created_at: Option<String>,
    #[diesel(sql_type = BigInt)]
    comments_count: i64,
    #[diesel(sql_type = BigInt)]
    commits_count: i64,
    #[diesel(sql_type = Nullable<Text>)]
    pr_title: Option<String>,
    #[diesel(sql_type = Text)]
    fetched_at: String,
    #[diesel(sql_type = BigInt)]
    batch_size_at_fetch: i64,
    #[diesel(sql_type = Bool)]
    enriched: bool,
}

impl From<RecordRow> for PullRequestRecord {
    fn from(row: RecordRow) -> Self {
        Self {
            pr_id: row.pr_id,
            pr_url: row.pr_url,
            repo_name: row.repo_name,
            author: row.author,
            pr_status: row.pr_status,
            created_at: row.created_at,
            comments_count: row.comments_count,
            commits_count: row.commits_count,
            pr_title: row.pr_title,
            fetched_at: row.fetched_at,
            batch_size_at_fetch: row.batch_size_at_fetch,
            enriched: row.enriched,
        }
    }
}

/// Column list shared by every query that reads whole records.
///
/// Rows written by older tools may hold `NULL` in columns tallyman always
/// fills, so those read back as zero or empty.
pub(super) const RECORD_COLUMNS: &str = "pr.pr_id AS pr_id, pr.pr_url AS pr_url, \
     COALESCE(pr.repo_name, '') AS repo_name, pr.author AS author, \
     pr.pr_status AS pr_status, pr.created_at AS created_at, \
     COALESCE(pr.comments_count, 0) AS comments_count, \
     COALESCE(pr.commits_count, 0) AS commits_count, pr.pr_title AS pr_title, \
     COALESCE(pr.date, '') AS fetched_at, COALESCE(pr.count, 0) AS batch_size_at_fetch, \
     pr.enriched AS enriched";

impl PullRequestStore {
    /// Opens the database at `database_url` without touching its schema.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::BlankDatabaseUrl`] when the URL is blank
    /// and [`PersistenceError::ConnectionFailed`] when `SQLite` cannot open
    /// it.
    pub fn open(database_url: &str) -> Result<Self, PersistenceError> {
        let connection = establish_connection(database_url)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Opens the database and applies pending migrations first.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened or
    /// migrated.
    pub fn open_migrated(
        database_url: &str,
        telemetry: &dyn TelemetrySink,
    ) -> Result<Self, PersistenceError> {
        let mut connection = establish_connection(database_url)?;
        let schema_version = run_migrations(&mut connection)?;
        telemetry.record(TelemetryEvent::SchemaVersionRecorded {
            schema_version: schema_version.as_str().to_owned(),
        });
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Inserts `record` unless a row with the same `pr_id` already exists.
    ///
    /// Returns `true` when a row was created and `false` when the existing
    /// row was left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::SchemaNotInitialised`] when migrations
    /// have not run, or [`PersistenceError::WriteFailed`] when the insert
    /// fails for another reason.
    pub fn upsert_pull_request(&self, record: &PullRequestRecord) -> Result<bool, PersistenceError> {
        self.with_connection(|connection| {
            let inserted = sql_query(
                "INSERT INTO pull_requests \
                 (date, count, pr_id, pr_url, repo_name, author, pr_status, created_at, \
                  comments_count, commits_count, pr_title, enriched) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT(pr_id) DO NOTHING;",
            )
            .bind::<Text, _>(record.fetched_at.as_str())
            .bind::<BigInt, _>(record.batch_size_at_fetch)
            .bind::<BigInt, _>(record.pr_id)
            .bind::<Nullable<Text>, _>(record.pr_url.as_deref())
            .bind::<Text, _>(record.repo_name.as_str())
            .bind::<Nullable<Text>, _>(record.author.as_deref())
            .bind::<Nullable<Text>, _>(record.pr_status.as_deref())
            .bind::<Nullable<Text>, _>(record.created_at.as_deref())
            .bind::<BigInt, _>(record.comments_count)
            .bind::<BigInt, _>(record.commits_count)
            .bind::<Nullable<Text>, _>(record.pr_title.as_deref())
            .bind::<Bool, _>(record.enriched)
            .execute(connection)
            .map_err(|error| map_write_error(connection, PULL_REQUESTS_TABLE, &error))?;

            Ok(inserted == 1)
        })
    }

    /// Maps `username` to `team_name`, replacing any previous mapping.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::SchemaNotInitialised`] when migrations
    /// have not run, or [`PersistenceError::WriteFailed`] when the write
    /// fails for another reason.
    pub fn upsert_team_mapping(
        &self,
        username: &str,
        team_name: &str,
    ) -> Result<(), PersistenceError> {
        self.with_connection(|connection| {
            sql_query("INSERT OR REPLACE INTO team_mapping (username, team_name) VALUES (?, ?);")
                .bind::<Text, _>(username)
                .bind::<Text, _>(team_name)
                .execute(connection)
                .map(drop)
                .map_err(|error| map_write_error(connection, TEAM_MAPPING_TABLE, &error))
        })
    }

    /// Loads the stored record for `pr_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails.
    pub fn pull_request(&self, pr_id: i64) -> Result<Option<PullRequestRecord>, PersistenceError> {
        self.with_connection(|connection| {
            let row: Option<RecordRow> = sql_query(format!(
                "SELECT {RECORD_COLUMNS} FROM pull_requests pr WHERE pr.pr_id = ? LIMIT 1;"
            ))
            .bind::<BigInt, _>(pr_id)
            .get_result(connection)
            .optional()
            .map_err(|error| map_query_error(connection, PULL_REQUESTS_TABLE, &error))?;

            Ok(row.map(PullRequestRecord::from))
        })
    }

    /// Counts stored pull requests.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails.
    pub fn count_pull_requests(&self) -> Result<i64, PersistenceError> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = BigInt)]
            total: i64,
        }

        self.with_connection(|connection| {
            let row: Row = sql_query("SELECT COUNT(*) AS total FROM pull_requests;")
                .get_result(connection)
                .map_err(|error| map_query_error(connection, PULL_REQUESTS_TABLE, &error))?;
            Ok(row.total)
        })
    }

    /// Runs `operation` with exclusive access to the connection.
    pub(super) fn with_connection<T>(
        &self,
        operation: impl FnOnce(&mut SqliteConnection) -> Result<T, PersistenceError>,
    ) -> Result<T, PersistenceError> {
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| PersistenceError::ConnectionFailed {
                message: "connection lock poisoned by an earlier panic".to_owned(),
            })?;
        operation(&mut guard)
    }
}

fn table_exists(
    connection: &mut SqliteConnection,
    table: &str,
) -> Result<bool, diesel::result::Error> {
    #[derive(Debug, QueryableByName)]
    struct Row {
        #[diesel(sql_type = BigInt)]
        count: i64,
    }

    let row: Row =
        sql_query("SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?;")
            .bind::<Text, _>(table)
            .get_result(connection)?;

    Ok(row.count > 0)
}

fn map_error_with_schema_check<F>(
    connection: &mut SqliteConnection,
    table: &str,
    error: &diesel::result::Error,
    create_error: F,
) -> PersistenceError
where
    F: Fn(String) -> PersistenceError,
{
    match table_exists(connection, table) {
        Ok(false) => PersistenceError::SchemaNotInitialised,
        Ok(true) => create_error(error.to_string()),
        Err(check_error) => create_error(format!(
            "schema presence check failed: {check_error}; original error: {error}"
        )),
    }
}

pub(super) fn map_query_error(
    connection: &mut SqliteConnection,
    table: &str,
    error: &diesel::result::Error,
) -> PersistenceError {
    map_error_with_schema_check(connection, table, error, |message| {
        PersistenceError::QueryFailed { message }
    })
}

fn map_write_error(
    connection: &mut SqliteConnection,
    table: &str,
    error: &diesel::result::Error,
) -> PersistenceError {
    map_error_with_schema_check(connection, table, error, |message| {
        PersistenceError::WriteFailed { message }
    })
}
