//! Error types exposed by the GitHub ingestion layer.

use thiserror::Error;

use crate::persistence::PersistenceError;

/// Errors surfaced while configuring an ingestion run or talking to GitHub.
///
/// Detail lookups never produce one of these: a failed enrichment degrades to
/// zero counts inside the ingestion pipeline instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IngestError {
    /// The authentication token was missing.
    #[error(
        "personal access token is required (use --token, TALLYMAN_TOKEN, or GITHUB_PERSONAL_TOKEN)"
    )]
    MissingToken,

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// A URL (API base, listing or continuation link) could not be parsed.
    #[error("URL is invalid: {0}")]
    InvalidUrl(String),

    /// The repository owner or name was blank.
    #[error("repository must be given as owner and name")]
    MissingRepository,

    /// A listing page came back with a non-success status that is not a
    /// recoverable rate limit.
    #[error("failed to fetch pull requests: {status} - {message}")]
    PageFetch {
        /// HTTP status code returned by GitHub.
        status: u16,
        /// Message from the response body, when GitHub supplied one.
        message: String,
    },

    /// The listing stayed throttled after repeated waits.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Description of the throttling condition.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// A request exceeded its timeout twice in a row.
    #[error("request to GitHub timed out: {message}")]
    Timeout {
        /// The request that timed out.
        message: String,
    },

    /// GitHub answered 200 but the body did not match the expected shape.
    #[error("unexpected response from GitHub: {message}")]
    Decode {
        /// Deserialisation error detail.
        message: String,
    },

    /// Persisting a pull request record failed.
    #[error("failed to persist pull request: {message}")]
    Store {
        /// Error detail from the persistence layer.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// The run was cancelled before it could finish.
    #[error("ingestion cancelled")]
    Cancelled,
}

impl From<PersistenceError> for IngestError {
    fn from(error: PersistenceError) -> Self {
        match error {
            PersistenceError::BlankDatabaseUrl | PersistenceError::SchemaNotInitialised => {
                Self::Configuration {
                    message: error.to_string(),
                }
            }
            PersistenceError::ConnectionFailed { .. }
            | PersistenceError::MigrationFailed { .. }
            | PersistenceError::PragmaFailed { .. }
            | PersistenceError::SchemaVersionQueryFailed { .. }
            | PersistenceError::MissingSchemaVersion
            | PersistenceError::WriteFailed { .. }
            | PersistenceError::QueryFailed { .. } => Self::Store {
                message: error.to_string(),
            },
        }
    }
}
