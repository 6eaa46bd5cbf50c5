//! `reqwest` implementation of [`PullRequestSource`].

use std::time::Duration;

use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::github::error::IngestError;
use crate::github::locator::PersonalAccessToken;
use crate::github::models::{
    ApiPullRequestDetail, ApiPullRequestSummary, PullRequestCounts, PullRequestSummary,
};
use crate::github::pagination::next_page_url;
use crate::github::rate_limit::RateLimitInfo;

use super::client::build_http_client;
use super::error_mapping::{map_decode_error, map_transport_error};
use super::http_utils::rejection_message;
use super::{PullRequestSource, RejectedResponse, SourceResponse, SummaryPage};

/// A timed-out request is sent at most this many times.
const MAX_ATTEMPTS: u8 = 2;

/// Pull request source talking to GitHub over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpPullRequestSource {
    client: Client,
}

struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl HttpPullRequestSource {
    /// Creates a source authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::Configuration` when the HTTP client cannot be
    /// built.
    pub fn new(token: &PersonalAccessToken, timeout: Duration) -> Result<Self, IngestError> {
        Ok(Self {
            client: build_http_client(token, timeout)?,
        })
    }

    async fn get(&self, url: &Url, operation: &str) -> Result<RawResponse, IngestError> {
        let mut attempt = 1;
        loop {
            match self.send_once(url).await {
                Ok(raw) => return Ok(raw),
                Err(error) if error.is_timeout() && attempt < MAX_ATTEMPTS => {
                    warn!(%url, attempt, "{operation} timed out, retrying");
                    attempt += 1;
                }
                Err(error) => return Err(map_transport_error(operation, &error)),
            }
        }
    }

    async fn send_once(&self, url: &Url) -> Result<RawResponse, reqwest::Error> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    fn reject(raw: &RawResponse) -> RejectedResponse {
        RejectedResponse {
            status: raw.status,
            message: rejection_message(&raw.body),
            rate_limit: RateLimitInfo::from_headers(&raw.headers),
        }
    }
}

#[async_trait]
impl PullRequestSource for HttpPullRequestSource {
    async fn list_page(&self, url: &Url) -> Result<SourceResponse<SummaryPage>, IngestError> {
        let raw = self.get(url, "list pull requests").await?;
        if raw.status != StatusCode::OK {
            return Ok(SourceResponse::Rejected(Self::reject(&raw)));
        }

        let api_items: Vec<ApiPullRequestSummary> = serde_json::from_str(&raw.body)
            .map_err(|error| map_decode_error("list pull requests", &error))?;
        let next = next_page_url(&raw.headers, url)?;
        debug!(%url, items = api_items.len(), has_next = next.is_some(), "listing page decoded");

        Ok(SourceResponse::Success(SummaryPage {
            items: api_items.into_iter().map(PullRequestSummary::from).collect(),
            next,
        }))
    }

    async fn pull_request_counts(
        &self,
        url: &Url,
    ) -> Result<SourceResponse<PullRequestCounts>, IngestError> {
        let raw = self.get(url, "get pull request").await?;
        if raw.status != StatusCode::OK {
            return Ok(SourceResponse::Rejected(Self::reject(&raw)));
        }

        let detail: ApiPullRequestDetail = serde_json::from_str(&raw.body)
            .map_err(|error| map_decode_error("get pull request", &error))?;
        Ok(SourceResponse::Success(detail.into()))
    }
}
