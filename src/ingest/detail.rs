//! Per-pull-request enrichment.
//!
//! Comment and commit totals only exist on the detail endpoint. Losing them
//! is tolerable, so every failure here degrades to [`DetailOutcome::Unavailable`]
//! and the pull request is still stored.

use tracing::debug;
use url::Url;

use crate::github::{PullRequestCounts, PullRequestSource, PullRequestSummary, SourceResponse};

/// Result of a detail lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailOutcome {
    /// The lookup succeeded.
    Enriched(PullRequestCounts),
    /// The lookup failed; counts are unknown.
    Unavailable,
}

impl DetailOutcome {
    /// Counts to persist, zero when unavailable.
    #[must_use]
    pub fn counts(self) -> PullRequestCounts {
        match self {
            Self::Enriched(counts) => counts,
            Self::Unavailable => PullRequestCounts::default(),
        }
    }

    /// Whether the counts came from GitHub.
    #[must_use]
    pub const fn is_enriched(self) -> bool {
        matches!(self, Self::Enriched(_))
    }
}

/// Looks up comment and commit counts for `summary`.
pub async fn fetch_detail(
    source: &dyn PullRequestSource,
    summary: &PullRequestSummary,
) -> DetailOutcome {
    let Ok(url) = Url::parse(&summary.detail_url) else {
        debug!(pr_id = summary.id, url = %summary.detail_url, "detail URL is not valid");
        return DetailOutcome::Unavailable;
    };

    match source.pull_request_counts(&url).await {
        Ok(SourceResponse::Success(counts)) => DetailOutcome::Enriched(counts),
        Ok(SourceResponse::Rejected(rejected)) => {
            debug!(
                pr_id = summary.id,
                status = rejected.status.as_u16(),
                message = %rejected.message,
                "detail lookup rejected, storing zero counts"
            );
            DetailOutcome::Unavailable
        }
        Err(error) => {
            debug!(pr_id = summary.id, %error, "detail lookup failed, storing zero counts");
            DetailOutcome::Unavailable
        }
    }
}
