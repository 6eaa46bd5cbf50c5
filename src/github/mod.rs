//! GitHub REST access for pull request ingestion.
//!
//! This module owns everything that knows about GitHub's wire format: the
//! repository coordinates and token wrappers, listing and detail payloads,
//! `Link` header pagination, rate-limit headers and the HTTP source itself.
//! Policy (when to wait, when to give up, what to persist) lives in
//! [`crate::ingest`].

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;
pub mod pagination;
pub mod rate_limit;

pub use error::IngestError;
pub use gateway::{
    HttpPullRequestSource, ListingState, PullRequestSource, RejectedResponse, SourceResponse,
    SummaryPage,
};
pub use locator::{PersonalAccessToken, RepositoryLocator, RepositoryName, RepositoryOwner};
pub use models::{PullRequestCounts, PullRequestSummary};
pub use rate_limit::RateLimitInfo;

#[cfg(test)]
pub use gateway::MockPullRequestSource;
