//! The HTTP seam between ingestion and the GitHub REST API.
//!
//! [`PullRequestSource`] performs exactly one logical GET per call and
//! classifies the answer: a decoded success, or a [`RejectedResponse`] that
//! carries enough of the response for the caller to decide whether to wait
//! and retry. Transport failures, repeated timeouts and undecodable bodies
//! surface as [`IngestError`]s. Retrying on rate limits is not the source's
//! job; the ingestion pipeline owns that policy.

mod client;
mod error_mapping;
mod http_utils;
mod transport;

pub use transport::HttpPullRequestSource;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use http::StatusCode;
use url::Url;

use super::error::IngestError;
use super::models::{PullRequestCounts, PullRequestSummary};
use super::rate_limit::RateLimitInfo;

/// Which pull requests a listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingState {
    /// Only open pull requests.
    #[default]
    Open,
    /// Only closed (including merged) pull requests.
    Closed,
    /// Every pull request regardless of state.
    All,
}

impl ListingState {
    /// Value of the `state` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

impl fmt::Display for ListingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingState {
    type Err = IngestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "all" => Ok(Self::All),
            other => Err(IngestError::Configuration {
                message: format!("state must be one of open, closed or all (got '{other}')"),
            }),
        }
    }
}

/// One decoded listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryPage {
    /// Pull requests on this page, in server order.
    pub items: Vec<PullRequestSummary>,
    /// Continuation link, absent on the last page.
    pub next: Option<Url>,
}

/// A non-success answer from GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedResponse {
    /// HTTP status returned.
    pub status: StatusCode,
    /// GitHub's `message` field, or the raw body when it is not JSON.
    pub message: String,
    /// Quota headers, when the response carried them.
    pub rate_limit: Option<RateLimitInfo>,
}

impl RejectedResponse {
    /// Converts the rejection into a fatal listing error.
    #[must_use]
    pub fn into_page_error(self) -> IngestError {
        IngestError::PageFetch {
            status: self.status.as_u16(),
            message: self.message,
        }
    }
}

/// Outcome of a request that reached GitHub and got an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceResponse<T> {
    /// 200 with a body of the expected shape.
    Success(T),
    /// Any other status.
    Rejected(RejectedResponse),
}

/// Source of pull request listings and details.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Fetches one listing page.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::Network`, `IngestError::Timeout` or
    /// `IngestError::Decode` when no usable answer was obtained.
    async fn list_page(&self, url: &Url) -> Result<SourceResponse<SummaryPage>, IngestError>;

    /// Fetches the comment and commit counts of one pull request.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::Network`, `IngestError::Timeout` or
    /// `IngestError::Decode` when no usable answer was obtained.
    async fn pull_request_counts(
        &self,
        url: &Url,
    ) -> Result<SourceResponse<PullRequestCounts>, IngestError>;
}
