//! Row types stored by [`super::PullRequestStore`].

use serde::Serialize;

/// Format of [`PullRequestRecord::fetched_at`].
pub const FETCHED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One observed pull request.
///
/// Rows are written once; later observations of the same `pr_id` are
/// discarded rather than merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestRecord {
    /// GitHub's stable pull request identifier.
    pub pr_id: i64,
    /// Browser URL of the pull request.
    pub pr_url: Option<String>,
    /// Repository the run was configured for.
    pub repo_name: String,
    /// Author login.
    pub author: Option<String>,
    /// GitHub state at fetch time, verbatim.
    pub pr_status: Option<String>,
    /// Creation timestamp as reported by GitHub (ISO 8601).
    pub created_at: Option<String>,
    /// Issue comments, zero when enrichment failed.
    pub comments_count: i64,
    /// Commits, zero when enrichment failed.
    pub commits_count: i64,
    /// Pull request title.
    pub pr_title: Option<String>,
    /// Local wall-clock time of the fetch, formatted with
    /// [`FETCHED_AT_FORMAT`].
    pub fetched_at: String,
    /// Number of pull requests on the listing page this row came from.
    pub batch_size_at_fetch: i64,
    /// Whether the detail lookup succeeded.
    pub enriched: bool,
}
