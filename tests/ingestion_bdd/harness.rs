//! Mock GitHub responses and the ingestion driver for the BDD tests.

use std::time::Duration;

use serde_json::{Value, json};
use tallyman::telemetry::NoopTelemetrySink;
use tallyman::{
    HttpPullRequestSource, Ingestion, IngestionFailure, IngestionReport, ListingState,
    PersonalAccessToken, PullRequestRecord, PullRequestStore, RepositoryLocator,
};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use super::state::IngestionState;

pub(crate) const PULLS_PATH: &str = "/repos/octo/repo/pulls";

fn server_uri(state: &IngestionState) -> String {
    state
        .server
        .with_ref(MockServer::uri)
        .unwrap_or_else(|| panic!("mock server not initialised"))
}

fn database_url(state: &IngestionState) -> String {
    state
        .database_url
        .get()
        .unwrap_or_else(|| panic!("database URL not initialised"))
}

pub(crate) fn detail_path(number: u32) -> String {
    format!("{PULLS_PATH}/{number}")
}

/// Builds the body of one listing page; pull request `n` has id `1000 + n`.
pub(crate) fn listing_page(state: &IngestionState, page: u32, per_page: u32) -> Value {
    let uri = server_uri(state);
    let first = (page - 1) * per_page + 1;
    let items: Vec<Value> = (first..first + per_page)
        .map(|number| {
            json!({
                "id": 1000 + number,
                "url": format!("{uri}{}", detail_path(number)),
                "html_url": format!("https://github.com/octo/repo/pull/{number}"),
                "user": { "login": format!("dev{number}") },
                "state": "open",
                "created_at": "2026-10-17T09:00:00Z",
                "title": format!("Change {number}")
            })
        })
        .collect();
    Value::Array(items)
}

/// Link header value pointing at `page`.
pub(crate) fn next_link(state: &IngestionState, page: u32, per_page: u32) -> String {
    format!(
        "<{}{PULLS_PATH}?state=open&per_page={per_page}&page={page}>; rel=\"next\"",
        server_uri(state)
    )
}

pub(crate) fn mount(state: &IngestionState, mock: Mock) {
    let runtime = state.runtime();
    state
        .server
        .with_ref(|server| runtime.block_on(mock.mount(server)))
        .unwrap_or_else(|| panic!("mock server not initialised"));
}

fn page_of(request: &Request) -> u32 {
    request
        .url
        .query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(1)
}

/// Counts listing requests the server received for `page`.
pub(crate) fn requests_for_page(state: &IngestionState, page: u32) -> usize {
    let runtime = state.runtime();
    let requests = state
        .server
        .with_ref(|server| runtime.block_on(server.received_requests()))
        .flatten()
        .unwrap_or_default();

    requests
        .iter()
        .filter(|request| request.url.path() == PULLS_PATH && page_of(request) == page)
        .count()
}

/// Runs one ingestion against the mock server and the scenario database.
pub(crate) fn run_ingestion(state: &IngestionState) -> Result<IngestionReport, IngestionFailure> {
    let runtime = state.runtime();
    let per_page = state.per_page.get().unwrap_or(30);
    let per_page_u8 =
        u8::try_from(per_page).unwrap_or_else(|error| panic!("per_page out of range: {error}"));

    let locator = RepositoryLocator::new(&server_uri(state), "octo", "repo")
        .unwrap_or_else(|error| panic!("locator should build: {error}"));
    let start = locator
        .pulls_url(ListingState::Open, per_page_u8)
        .unwrap_or_else(|error| panic!("listing URL should build: {error}"));
    let token = PersonalAccessToken::new("ghp_test")
        .unwrap_or_else(|error| panic!("token should be valid: {error}"));
    let source = HttpPullRequestSource::new(&token, Duration::from_secs(5))
        .unwrap_or_else(|error| panic!("source should build: {error}"));
    let store = PullRequestStore::open_migrated(&database_url(state), &NoopTelemetrySink)
        .unwrap_or_else(|error| panic!("store should open: {error}"));

    runtime.block_on(Ingestion::new(&source, &store, "repo", start).run())
}

/// Reads a stored record back by pull request number.
pub(crate) fn stored(state: &IngestionState, number: u32) -> Option<PullRequestRecord> {
    let store = PullRequestStore::open_migrated(&database_url(state), &NoopTelemetrySink)
        .unwrap_or_else(|error| panic!("store should open: {error}"));
    store
        .pull_request(1000 + i64::from(number))
        .unwrap_or_else(|error| panic!("read should succeed: {error}"))
}

/// Number of stored pull requests.
pub(crate) fn stored_count(state: &IngestionState) -> i64 {
    let store = PullRequestStore::open_migrated(&database_url(state), &NoopTelemetrySink)
        .unwrap_or_else(|error| panic!("store should open: {error}"));
    store
        .count_pull_requests()
        .unwrap_or_else(|error| panic!("count should succeed: {error}"))
}

/// Serves `pages` listing pages of `per_page` items plus their details.
pub(crate) fn mount_listing(state: &IngestionState, pages: u32, per_page: u32) {
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};

    state.per_page.set(per_page);
    for page in 1..=pages {
        let mut response = ResponseTemplate::new(200).set_body_json(listing_page(state, page, per_page));
        if page < pages {
            response = response.insert_header("Link", next_link(state, page + 1, per_page).as_str());
        }
        let mock = if page == 1 {
            Mock::given(method("GET"))
                .and(path(PULLS_PATH))
                .and(query_param_is_missing("page"))
        } else {
            Mock::given(method("GET"))
                .and(path(PULLS_PATH))
                .and(query_param("page", page.to_string()))
        };
        mount(state, mock.respond_with(response));
    }

    for number in 1..=pages * per_page {
        mount(
            state,
            Mock::given(method("GET"))
                .and(path(detail_path(number)))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({ "comments": number, "commits": 1 })),
                ),
        );
    }
}
