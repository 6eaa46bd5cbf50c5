//! Behavioural tests for preparing the database and its schema telemetry.

mod support;

use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use tallyman::persistence::{PersistenceError, SchemaVersion, migrate_database};
use tallyman::telemetry::TelemetryEvent;
use tallyman::telemetry::test_support::RecordingSink;
use tallyman::{PullRequestRecord, PullRequestStore};
use tempfile::TempDir;

use support::{create_temp_dir, database_url_in};

type MigrationOutcome = Result<SchemaVersion, PersistenceError>;

#[derive(ScenarioState, Default)]
struct DatabaseState {
    location: Slot<String>,
    scratch: Slot<TempDir>,
    telemetry: Slot<RecordingSink>,
    outcomes: Slot<Vec<MigrationOutcome>>,
}

impl DatabaseState {
    fn location(&self) -> String {
        self.location
            .get()
            .unwrap_or_else(|| panic!("database location not chosen"))
    }

    fn outcomes(&self) -> Vec<MigrationOutcome> {
        self.outcomes.get().unwrap_or_default()
    }

    fn single_failure(&self) -> PersistenceError {
        match self.outcomes().as_slice() {
            [Err(error)] => error.clone(),
            other => panic!("expected one failed migration, got {other:?}"),
        }
    }

    fn scratch_dir(&self) -> TempDir {
        create_temp_dir()
            .unwrap_or_else(|error| panic!("failed to create temporary directory: {error}"))
    }
}

#[fixture]
fn database_state() -> DatabaseState {
    let state = DatabaseState::default();
    state.telemetry.set(RecordingSink::default());
    state
}

fn sample_record() -> PullRequestRecord {
    PullRequestRecord {
        pr_id: 77,
        pr_url: Some("https://github.com/octo/repo/pull/7".to_owned()),
        repo_name: "repo".to_owned(),
        author: Some("alice".to_owned()),
        pr_status: Some("open".to_owned()),
        created_at: Some("2026-10-17T09:00:00Z".to_owned()),
        comments_count: 0,
        commits_count: 1,
        pr_title: Some("Tidy".to_owned()),
        fetched_at: "2026-10-18 09:00:00".to_owned(),
        batch_size_at_fetch: 1,
        enriched: true,
    }
}

#[given("a fresh database file")]
fn fresh_database_file(database_state: &DatabaseState) {
    let scratch = database_state.scratch_dir();
    database_state
        .location
        .set(database_url_in(&scratch, "tallyman.sqlite"));
    database_state.scratch.set(scratch);
}

#[given("the database location {location}")]
fn literal_location(database_state: &DatabaseState, location: String) {
    database_state
        .location
        .set(location.trim_matches('"').to_owned());
}

#[given("a directory as the database location")]
fn directory_location(database_state: &DatabaseState) {
    let scratch = database_state.scratch_dir();
    database_state
        .location
        .set(scratch.path().to_string_lossy().into_owned());
    database_state.scratch.set(scratch);
}

#[when("the database is migrated")]
fn migrate_once(database_state: &DatabaseState) {
    let location = database_state.location();
    let outcome = database_state
        .telemetry
        .with_ref(|telemetry| migrate_database(&location, telemetry))
        .unwrap_or_else(|| panic!("telemetry sink not initialised"));

    let mut outcomes = database_state.outcomes();
    outcomes.push(outcome);
    database_state.outcomes.set(outcomes);
}

#[when("the database is migrated again")]
fn migrate_again(database_state: &DatabaseState) {
    migrate_once(database_state);
}

#[then("every migration succeeded with schema {expected}")]
fn every_migration_succeeded(database_state: &DatabaseState, expected: String) {
    let expected_version = expected.trim_matches('"');
    let outcomes = database_state.outcomes();

    assert!(!outcomes.is_empty(), "no migration ran");
    for outcome in &outcomes {
        match outcome {
            Ok(version) => assert_eq!(version.as_str(), expected_version),
            Err(error) => panic!("migration failed: {error}"),
        }
    }
}

#[then("the schema version event count is {count:u32}")]
fn schema_events_recorded(database_state: &DatabaseState, count: u32) {
    let events = database_state
        .telemetry
        .with_ref(RecordingSink::take)
        .unwrap_or_else(|| panic!("telemetry sink not initialised"));

    let versions: Vec<String> = events
        .into_iter()
        .filter_map(|event| match event {
            TelemetryEvent::SchemaVersionRecorded { schema_version } => Some(schema_version),
            TelemetryEvent::IngestionCompleted { .. } => None,
        })
        .collect();

    assert_eq!(
        versions.len(),
        usize::try_from(count).unwrap_or(usize::MAX),
        "recorded versions: {versions:?}"
    );
    assert!(
        versions.windows(2).all(|pair| pair.first() == pair.last()),
        "schema version changed between runs: {versions:?}"
    );
}

#[then("the store accepts a pull request")]
fn store_accepts_pull_request(database_state: &DatabaseState) {
    let store = PullRequestStore::open(&database_state.location())
        .unwrap_or_else(|error| panic!("store should open: {error}"));

    let inserted = store
        .upsert_pull_request(&sample_record())
        .unwrap_or_else(|error| panic!("insert should succeed: {error}"));

    assert!(inserted, "expected a new row");
}

#[then("the store refuses a pull request until migrations run")]
fn store_refuses_before_migration(database_state: &DatabaseState) {
    let store = PullRequestStore::open(&database_state.location())
        .unwrap_or_else(|error| panic!("store should open: {error}"));

    let result = store.upsert_pull_request(&sample_record());

    assert!(
        matches!(result, Err(PersistenceError::SchemaNotInitialised)),
        "expected SchemaNotInitialised, got {result:?}"
    );
}

#[then("the migration failed with {expected}")]
fn migration_failed_with(database_state: &DatabaseState, expected: String) {
    let error = database_state.single_failure();

    assert_eq!(error.to_string(), expected.trim_matches('"'));
}

#[then("the migration failed starting with {expected}")]
fn migration_failed_starting_with(database_state: &DatabaseState, expected: String) {
    let error = database_state.single_failure().to_string();
    let prefix = expected.trim_matches('"');

    assert!(
        error.starts_with(prefix),
        "expected error to start with {prefix:?}, got {error}"
    );
}

#[scenario(path = "tests/features/database_migration.feature", index = 0)]
fn fresh_file_is_migrated(database_state: DatabaseState) {
    let _ = database_state;
}

#[scenario(path = "tests/features/database_migration.feature", index = 1)]
fn repeated_migration_is_idempotent(database_state: DatabaseState) {
    let _ = database_state;
}

#[scenario(path = "tests/features/database_migration.feature", index = 2)]
fn whitespace_location_is_rejected(database_state: DatabaseState) {
    let _ = database_state;
}

#[scenario(path = "tests/features/database_migration.feature", index = 3)]
fn directory_location_is_rejected(database_state: DatabaseState) {
    let _ = database_state;
}

#[scenario(path = "tests/features/database_migration.feature", index = 4)]
fn unmigrated_store_refuses_writes(database_state: DatabaseState) {
    let _ = database_state;
}
