//! Errors raised by the `SQLite` store.

use thiserror::Error;

/// Errors returned while opening, migrating, writing to or reading from the
/// `SQLite` store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    /// The database location is empty or whitespace.
    #[error("database URL must not be blank (use --database-url or TALLYMAN_DATABASE_URL)")]
    BlankDatabaseUrl,

    /// Establishing a `SQLite` connection failed.
    #[error("failed to connect to SQLite database: {message}")]
    ConnectionFailed {
        /// Error detail from Diesel.
        message: String,
    },

    /// Running pending migrations failed.
    #[error("failed to run database migrations: {message}")]
    MigrationFailed {
        /// Error detail from Diesel migrations.
        message: String,
    },

    /// A connection pragma was rejected.
    #[error("failed to configure SQLite connection: {message}")]
    PragmaFailed {
        /// Error detail from the PRAGMA execution.
        message: String,
    },

    /// Reading the schema version from the migration table failed.
    #[error("failed to read schema version after migrations: {message}")]
    SchemaVersionQueryFailed {
        /// Error detail from Diesel query execution.
        message: String,
    },

    /// Migrations ran but left no version behind.
    #[error("migration table is empty after running migrations")]
    MissingSchemaVersion,

    /// The store tables are missing; migrations have not been run.
    #[error("database schema is not initialised (run tallyman --migrate-db first)")]
    SchemaNotInitialised,

    /// A write statement failed.
    #[error("failed to write to SQLite database: {message}")]
    WriteFailed {
        /// Error detail from Diesel query execution.
        message: String,
    },

    /// A read statement failed.
    #[error("failed to query SQLite database: {message}")]
    QueryFailed {
        /// Error detail from Diesel query execution.
        message: String,
    },
}
