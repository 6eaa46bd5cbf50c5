//! The ingestion pipeline.
//!
//! A run walks the pull request listing page by page ([`walker`]), waits out
//! exhausted rate-limit windows ([`governor`]), enriches each pull request
//! with comment and commit counts ([`detail`]) and writes it to the store
//! ([`orchestrator`]). Everything happens in order on one task: no page is
//! fetched before the previous page is stored.

pub mod detail;
pub mod governor;
pub mod orchestrator;
pub mod walker;

#[cfg(test)]
mod test_helpers;

pub use detail::DetailOutcome;
pub use governor::{Clock, FixedClock, RateLimitGovernor, SystemClock};
pub use orchestrator::{Ingestion, IngestionFailure, IngestionReport};
pub use walker::{MAX_CONSECUTIVE_THROTTLES, PageWalker, WalkState};
