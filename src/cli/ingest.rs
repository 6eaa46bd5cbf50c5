//! The default mode: ingest one repository's pull requests.

use tallyman::telemetry::StderrJsonlTelemetrySink;
use tallyman::{
    HttpPullRequestSource, IngestError, Ingestion, IngestionReport, PullRequestStore,
    RepositoryLocator, TallymanConfig,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::CliError;

/// Validates the configuration, opens (and migrates) the store, then runs
/// one ingestion from the first listing page.
///
/// # Errors
///
/// Returns [`CliError::Setup`] when configuration is incomplete or the store
/// cannot be opened, and [`CliError::Ingestion`] when the run stops early.
pub async fn run(
    config: &TallymanConfig,
    cancel: CancellationToken,
) -> Result<IngestionReport, CliError> {
    let token = config.resolve_token()?;
    let (owner, repo) = config.require_repository_info()?;
    let state = config.listing_state()?;
    let per_page = config.validated_per_page()?;
    let timeout = config.request_timeout()?;

    let locator = RepositoryLocator::new(&config.api_base, owner, repo)?;
    let start = locator.pulls_url(state, per_page)?;
    let source = HttpPullRequestSource::new(&token, timeout)?;

    let telemetry = StderrJsonlTelemetrySink;
    let store = PullRequestStore::open_migrated(&config.database_url, &telemetry)
        .map_err(IngestError::from)?;

    info!(owner, repo, %state, per_page, "starting ingestion");
    let report = Ingestion::new(&source, &store, locator.repository().as_str(), start)
        .with_cancellation(cancel)
        .with_telemetry(&telemetry)
        .run()
        .await?;
    Ok(report)
}
