//! Builders shared by the ingestion unit tests.

use http::StatusCode;
use url::Url;

use crate::github::{
    PullRequestSummary, RateLimitInfo, RejectedResponse, SourceResponse, SummaryPage,
};

pub(crate) const NOW: u64 = 1_700_000_000;

pub(crate) fn listing_url(page: u32) -> Url {
    Url::parse(&format!(
        "https://api.github.com/repos/octo/repo/pulls?state=open&page={page}"
    ))
    .expect("listing URL should parse")
}

pub(crate) fn summary(id: i64) -> PullRequestSummary {
    PullRequestSummary {
        id,
        detail_url: format!("https://api.github.com/repos/octo/repo/pulls/{id}"),
        html_url: Some(format!("https://github.com/octo/repo/pull/{id}")),
        author: Some("alice".to_owned()),
        state: Some("open".to_owned()),
        created_at: Some("2026-10-01T10:00:00Z".to_owned()),
        title: Some(format!("Change {id}")),
    }
}

pub(crate) fn page(ids: &[i64], next: Option<Url>) -> SourceResponse<SummaryPage> {
    SourceResponse::Success(SummaryPage {
        items: ids.iter().copied().map(summary).collect(),
        next,
    })
}

pub(crate) fn throttled(reset_at: u64) -> SourceResponse<SummaryPage> {
    SourceResponse::Rejected(RejectedResponse {
        status: StatusCode::FORBIDDEN,
        message: "API rate limit exceeded".to_owned(),
        rate_limit: Some(RateLimitInfo::new(Some(5000), 0, reset_at)),
    })
}

pub(crate) fn server_error() -> SourceResponse<SummaryPage> {
    SourceResponse::Rejected(RejectedResponse {
        status: StatusCode::BAD_GATEWAY,
        message: "Server Error".to_owned(),
        rate_limit: None,
    })
}
