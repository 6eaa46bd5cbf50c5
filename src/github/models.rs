//! Pull request shapes returned by the GitHub REST API.
//!
//! The `Api*` structs mirror the JSON payloads and stay private to the GitHub
//! layer; everything else in the crate works with the domain types.

use serde::Deserialize;

/// One entry of a pull request listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSummary {
    /// Stable numeric identifier assigned by GitHub.
    pub id: i64,
    /// API URL of the pull request, used for the detail lookup.
    pub detail_url: String,
    /// Browser URL of the pull request.
    pub html_url: Option<String>,
    /// Author login.
    pub author: Option<String>,
    /// State as reported by GitHub (`open` or `closed`).
    pub state: Option<String>,
    /// Creation timestamp in ISO 8601 form.
    pub created_at: Option<String>,
    /// Pull request title.
    pub title: Option<String>,
}

/// Comment and commit totals from a pull request detail response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullRequestCounts {
    /// Issue comments on the pull request.
    pub comments: i64,
    /// Commits on the pull request branch.
    pub commits: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiUser {
    pub(super) login: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiPullRequestSummary {
    pub(super) id: i64,
    pub(super) url: String,
    pub(super) html_url: Option<String>,
    pub(super) user: Option<ApiUser>,
    pub(super) state: Option<String>,
    pub(super) created_at: Option<String>,
    pub(super) title: Option<String>,
}

impl From<ApiPullRequestSummary> for PullRequestSummary {
    fn from(value: ApiPullRequestSummary) -> Self {
        Self {
            id: value.id,
            detail_url: value.url,
            html_url: value.html_url,
            author: value.user.and_then(|user| user.login),
            state: value.state,
            created_at: value.created_at,
            title: value.title,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiPullRequestDetail {
    pub(super) comments: i64,
    pub(super) commits: i64,
}

impl From<ApiPullRequestDetail> for PullRequestCounts {
    fn from(value: ApiPullRequestDetail) -> Self {
        Self {
            comments: value.comments,
            commits: value.commits,
        }
    }
}
