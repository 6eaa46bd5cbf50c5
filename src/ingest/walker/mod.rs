//! Paginated listing traversal.
//!
//! The walker is an explicit state machine over the listing's continuation
//! links. Each call to [`PageWalker::next_batch`] performs at most one
//! successful page fetch; rate-limited attempts are retried in place after
//! the governor's wait, and any other failure ends the walk.

use std::time::Duration;

use tracing::{error, info, warn};
use url::Url;

use crate::github::{IngestError, PullRequestSource, PullRequestSummary, SourceResponse};

use super::governor::RateLimitGovernor;

/// Throttled attempts on one URL allowed before the walk gives up.
pub const MAX_CONSECUTIVE_THROTTLES: u32 = 5;

/// Where the walk currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkState {
    /// The next call fetches this URL.
    Fetching(Url),
    /// The last attempt on `url` was throttled; retry it after `wait`.
    RateLimited {
        /// Listing URL to retry unchanged.
        url: Url,
        /// Time left until the quota window reopens.
        wait: Duration,
    },
    /// The last page has been returned.
    Exhausted,
    /// The walk stopped on an error.
    Failed,
}

/// Lazily walks a listing, one page per call.
pub struct PageWalker<'a> {
    source: &'a dyn PullRequestSource,
    governor: &'a RateLimitGovernor,
    state: WalkState,
    consecutive_throttles: u32,
    pages_fetched: u64,
}

impl<'a> PageWalker<'a> {
    /// Starts a walk at `start`.
    #[must_use]
    pub const fn new(
        source: &'a dyn PullRequestSource,
        governor: &'a RateLimitGovernor,
        start: Url,
    ) -> Self {
        Self {
            source,
            governor,
            state: WalkState::Fetching(start),
            consecutive_throttles: 0,
            pages_fetched: 0,
        }
    }

    /// Current state of the walk.
    #[must_use]
    pub const fn state(&self) -> &WalkState {
        &self.state
    }

    /// Pages returned so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }

    /// Returns the next page of pull requests, or `None` once the listing is
    /// exhausted or the walk has failed.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the walk: `PageFetch` for a rejected page
    /// that is not a rate limit, `RateLimitExceeded` after
    /// [`MAX_CONSECUTIVE_THROTTLES`] throttles in a row, `Cancelled` when the
    /// run's token fires, or the source's transport error. Later calls
    /// return `Ok(None)`.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<PullRequestSummary>>, IngestError> {
        loop {
            match std::mem::replace(&mut self.state, WalkState::Failed) {
                WalkState::Exhausted => {
                    self.state = WalkState::Exhausted;
                    return Ok(None);
                }
                WalkState::Failed => return Ok(None),
                WalkState::RateLimited { url, wait } => {
                    self.governor.suspend(wait).await?;
                    self.state = WalkState::Fetching(url);
                }
                WalkState::Fetching(url) => {
                    if let Some(batch) = self.fetch(url).await? {
                        return Ok(Some(batch));
                    }
                }
            }
        }
    }

    /// Performs one attempt; `Ok(None)` means the attempt was throttled and
    /// the state now holds the retry.
    async fn fetch(&mut self, url: Url) -> Result<Option<Vec<PullRequestSummary>>, IngestError> {
        if self.governor.is_cancelled() {
            return Err(IngestError::Cancelled);
        }

        info!(%url, "fetching pull request page");
        let response = self.source.list_page(&url).await.inspect_err(|err| {
            error!(%url, error = %err, "pull request page could not be fetched");
        })?;

        match response {
            SourceResponse::Success(page) => {
                self.consecutive_throttles = 0;
                self.pages_fetched += 1;
                self.state = match page.next {
                    Some(next) if next == url => {
                        warn!(%url, "next link points back at the same page, stopping");
                        WalkState::Exhausted
                    }
                    Some(next) => {
                        info!(%next, "advancing to next page");
                        WalkState::Fetching(next)
                    }
                    None => WalkState::Exhausted,
                };
                Ok(Some(page.items))
            }
            SourceResponse::Rejected(rejected) => {
                let Some(wait) = self.governor.assess(&rejected) else {
                    error!(
                        %url,
                        status = rejected.status.as_u16(),
                        message = %rejected.message,
                        "failed to fetch pull requests"
                    );
                    return Err(rejected.into_page_error());
                };

                self.consecutive_throttles += 1;
                if self.consecutive_throttles > MAX_CONSECUTIVE_THROTTLES {
                    error!(%url, attempts = self.consecutive_throttles, "rate limit never lifted");
                    return Err(IngestError::RateLimitExceeded {
                        message: format!(
                            "{url} was still throttled after {MAX_CONSECUTIVE_THROTTLES} waits"
                        ),
                    });
                }

                self.state = WalkState::RateLimited { url, wait };
                Ok(None)
            }
        }
    }
}
