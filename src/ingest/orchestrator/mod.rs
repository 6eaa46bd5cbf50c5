//! Drives one ingestion run from the first listing page to the store.

use std::sync::Arc;

use chrono::Local;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use url::Url;

use crate::github::{IngestError, PullRequestSource, PullRequestSummary};
use crate::persistence::{FETCHED_AT_FORMAT, PullRequestRecord, PullRequestStore};
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

use super::detail::{DetailOutcome, fetch_detail};
use super::governor::{Clock, RateLimitGovernor, SystemClock};
use super::walker::PageWalker;

/// Totals of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionReport {
    /// Rows newly written; already-stored pull requests are not counted.
    pub inserted: u64,
    /// Pull requests observed across all pages.
    pub seen: u64,
    /// Listing pages processed.
    pub pages: u64,
}

/// A run that stopped before the listing was exhausted.
///
/// Rows counted in `partial` are committed and stay in the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error} ({inserted} rows inserted before the failure)", inserted = .partial.inserted)]
pub struct IngestionFailure {
    /// Totals accumulated before the failure.
    pub partial: IngestionReport,
    /// What stopped the run.
    #[source]
    pub error: IngestError,
}

/// One configured ingestion run.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use tallyman::github::{HttpPullRequestSource, ListingState, PersonalAccessToken, RepositoryLocator};
/// use tallyman::ingest::Ingestion;
/// use tallyman::persistence::PullRequestStore;
/// use tallyman::telemetry::NoopTelemetrySink;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let token = PersonalAccessToken::new("ghp_example")?;
/// let source = HttpPullRequestSource::new(&token, Duration::from_secs(30))?;
/// let store = PullRequestStore::open_migrated("github_data.db", &NoopTelemetrySink)?;
/// let locator = RepositoryLocator::from_owner_repo("octo", "repo")?;
/// let start = locator.pulls_url(ListingState::Open, 30)?;
///
/// let report = Ingestion::new(&source, &store, "repo", start).run().await?;
/// println!("Total rows inserted: {}", report.inserted);
/// # Ok(())
/// # }
/// ```
pub struct Ingestion<'a> {
    source: &'a dyn PullRequestSource,
    store: &'a PullRequestStore,
    repo_name: String,
    start: Url,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
    telemetry: &'a dyn TelemetrySink,
}

impl<'a> Ingestion<'a> {
    /// Prepares a run that starts at `start` and stores rows under
    /// `repo_name`.
    #[must_use]
    pub fn new(
        source: &'a dyn PullRequestSource,
        store: &'a PullRequestStore,
        repo_name: impl Into<String>,
        start: Url,
    ) -> Self {
        Self {
            source,
            store,
            repo_name: repo_name.into(),
            start,
            clock: Arc::new(SystemClock),
            cancel: CancellationToken::new(),
            telemetry: &NoopTelemetrySink,
        }
    }

    /// Replaces the wall clock used for rate-limit waits.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Stops the run at the next page boundary or rate-limit wait once
    /// `cancel` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sends the completion event to `telemetry`.
    #[must_use]
    pub const fn with_telemetry(mut self, telemetry: &'a dyn TelemetrySink) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Walks the listing, enriches each pull request and stores it.
    ///
    /// Pages and items are processed strictly in order. Every run starts
    /// from the first page; pull requests stored by an earlier run are
    /// observed again and skipped by the store.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionFailure`] when a page cannot be fetched, the rate
    /// limit never lifts, a row cannot be written or the run is cancelled.
    pub async fn run(&self) -> Result<IngestionReport, IngestionFailure> {
        let governor = RateLimitGovernor::new(Arc::clone(&self.clock), self.cancel.clone());
        let mut walker = PageWalker::new(self.source, &governor, self.start.clone());
        let mut report = IngestionReport::default();

        loop {
            let batch = match walker.next_batch().await {
                Ok(Some(batch)) => batch,
                Ok(None) => break,
                Err(error) => return Err(Self::fail(report, error)),
            };
            report.pages += 1;

            if let Err(error) = self.store_batch(&batch, &mut report).await {
                return Err(Self::fail(report, error));
            }
            info!(
                page = report.pages,
                items = batch.len(),
                inserted = report.inserted,
                "page stored"
            );
        }

        info!(
            inserted = report.inserted,
            seen = report.seen,
            pages = report.pages,
            "ingestion complete"
        );
        self.telemetry.record(TelemetryEvent::IngestionCompleted {
            inserted: report.inserted,
            seen: report.seen,
            pages: report.pages,
        });
        Ok(report)
    }

    async fn store_batch(
        &self,
        batch: &[PullRequestSummary],
        report: &mut IngestionReport,
    ) -> Result<(), IngestError> {
        let batch_size = i64::try_from(batch.len()).unwrap_or(i64::MAX);
        for summary in batch {
            let outcome = fetch_detail(self.source, summary).await;
            let record = build_record(summary, &self.repo_name, outcome, batch_size);
            report.seen += 1;

            if self.store.upsert_pull_request(&record)? {
                report.inserted += 1;
            } else {
                debug!(pr_id = record.pr_id, "pull request already stored");
            }
        }
        Ok(())
    }

    fn fail(partial: IngestionReport, error: IngestError) -> IngestionFailure {
        error!(
            %error,
            inserted = partial.inserted,
            pages = partial.pages,
            "ingestion stopped"
        );
        IngestionFailure { partial, error }
    }
}

fn build_record(
    summary: &PullRequestSummary,
    repo_name: &str,
    outcome: DetailOutcome,
    batch_size: i64,
) -> PullRequestRecord {
    let counts = outcome.counts();
    PullRequestRecord {
        pr_id: summary.id,
        pr_url: summary.html_url.clone(),
        repo_name: repo_name.to_owned(),
        author: summary.author.clone(),
        pr_status: summary.state.clone(),
        created_at: summary.created_at.clone(),
        comments_count: counts.comments,
        commits_count: counts.commits,
        pr_title: summary.title.clone(),
        fetched_at: Local::now().format(FETCHED_AT_FORMAT).to_string(),
        batch_size_at_fetch: batch_size,
        enriched: outcome.is_enriched(),
    }
}
