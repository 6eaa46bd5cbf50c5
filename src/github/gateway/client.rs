//! `reqwest` client construction for the GitHub source.

use std::time::Duration;

use http::HeaderValue;
use http::header::{ACCEPT, AUTHORIZATION, HeaderMap, USER_AGENT};
use reqwest::Client;

use crate::github::error::IngestError;
use crate::github::locator::PersonalAccessToken;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const CLIENT_USER_AGENT: &str = concat!("tallyman/", env!("CARGO_PKG_VERSION"));

/// Builds an authenticated client whose every request carries `timeout`.
///
/// # Errors
///
/// Returns `IngestError::Configuration` when the token cannot be sent as a
/// header value or the TLS backend fails to initialise.
pub(super) fn build_http_client(
    token: &PersonalAccessToken,
    timeout: Duration,
) -> Result<Client, IngestError> {
    let mut authorization = HeaderValue::from_str(&format!("token {}", token.value())).map_err(
        |_| IngestError::Configuration {
            message: "personal access token contains characters not allowed in a header"
                .to_owned(),
        },
    )?;
    authorization.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|error| IngestError::Configuration {
            message: format!("failed to configure GitHub HTTP client: {error}"),
        })
}
