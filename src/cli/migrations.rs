//! Database migration operations.

use tallyman::persistence::migrate_database;
use tallyman::telemetry::StderrJsonlTelemetrySink;
use tallyman::{IngestError, TallymanConfig};

/// Runs database migrations.
///
/// # Errors
///
/// Returns [`IngestError::Configuration`] if the database URL is blank.
/// Returns [`IngestError::Store`] for connection or migration failures.
pub fn run(config: &TallymanConfig) -> Result<(), IngestError> {
    let telemetry = StderrJsonlTelemetrySink;
    migrate_database(&config.database_url, &telemetry)
        .map(drop)
        .map_err(IngestError::from)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tallyman::{IngestError, TallymanConfig};

    use super::run;

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    fn migrate_db_rejects_blank_database_url(#[case] database_url: &str) {
        let config = TallymanConfig {
            database_url: database_url.to_owned(),
            migrate_db: true,
            ..Default::default()
        };

        match run(&config) {
            Err(IngestError::Configuration { message }) => {
                assert!(
                    message.contains("database URL must not be blank"),
                    "unexpected message: {message:?}"
                );
            }
            other => panic!("expected Configuration error, got {other:?}"),
        }
    }

    #[rstest]
    fn migrate_db_succeeds_for_in_memory_database() {
        let config = TallymanConfig {
            database_url: ":memory:".to_owned(),
            migrate_db: true,
            ..Default::default()
        };

        assert_eq!(run(&config), Ok(()));
    }
}
