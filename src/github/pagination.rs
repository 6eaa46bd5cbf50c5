//! Continuation links for paginated GitHub listings.
//!
//! GitHub paginates list endpoints with an RFC 8288 `Link` header such as
//! `<https://api.github.com/...&page=2>; rel="next", <...>; rel="last"`. Only
//! the `next` relation matters to ingestion: its absence marks the last page.

use http::HeaderMap;
use http::header::LINK;
use url::Url;

use super::error::IngestError;

/// Returns the `rel="next"` target of a response, resolved against the URL
/// that produced it.
///
/// # Errors
///
/// Returns `IngestError::InvalidUrl` when a `next` link is present but cannot
/// be resolved to a URL.
///
/// # Example
///
/// ```
/// use http::HeaderMap;
/// use tallyman::github::pagination::next_page_url;
/// use url::Url;
///
/// let current = Url::parse("https://api.github.com/repos/o/r/pulls").expect("url");
/// let mut headers = HeaderMap::new();
/// headers.insert(
///     http::header::LINK,
///     "<https://api.github.com/repos/o/r/pulls?page=2>; rel=\"next\""
///         .parse()
///         .expect("header"),
/// );
///
/// let next = next_page_url(&headers, &current).expect("link should parse");
/// assert_eq!(
///     next.map(String::from).as_deref(),
///     Some("https://api.github.com/repos/o/r/pulls?page=2")
/// );
/// ```
pub fn next_page_url(headers: &HeaderMap, current: &Url) -> Result<Option<Url>, IngestError> {
    let target = headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(link_entries)
        .find(|(_, params)| has_next_relation(params))
        .map(|(target, _)| target);

    target
        .map(|raw| {
            current
                .join(raw.trim())
                .map_err(|error| IngestError::InvalidUrl(format!("next link {raw}: {error}")))
        })
        .transpose()
}

/// Splits one `Link` header value into `(target, parameters)` pairs.
fn link_entries(value: &str) -> impl Iterator<Item = (&str, &str)> {
    value
        .split('<')
        .skip(1)
        .filter_map(|chunk| chunk.split_once('>'))
}

fn has_next_relation(params: &str) -> bool {
    params
        .split(';')
        .filter_map(|param| param.split_once('='))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("rel"))
        .any(|(_, value)| {
            value
                .trim()
                .trim_end_matches(',')
                .trim()
                .trim_matches('"')
                .split_whitespace()
                .any(|relation| relation.eq_ignore_ascii_case("next"))
        })
}

#[cfg(test)]
mod tests {
    use http::header::LINK;
    use http::{HeaderMap, HeaderValue};
    use rstest::{fixture, rstest};
    use url::Url;

    use super::next_page_url;
    use crate::github::error::IngestError;

    #[fixture]
    fn current() -> Url {
        Url::parse("https://api.github.com/repos/octo/repo/pulls?state=open")
            .expect("fixture URL should parse")
    }

    fn with_link(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_str(value).expect("header value should be valid"),
        );
        headers
    }

    #[rstest]
    #[case::next_first(
        "<https://api.github.com/repos/octo/repo/pulls?page=2>; rel=\"next\", \
         <https://api.github.com/repos/octo/repo/pulls?page=5>; rel=\"last\"",
        "https://api.github.com/repos/octo/repo/pulls?page=2"
    )]
    #[case::next_after_prev(
        "<https://api.github.com/repos/octo/repo/pulls?page=1>; rel=\"prev\", \
         <https://api.github.com/repos/octo/repo/pulls?page=3>; rel=\"next\"",
        "https://api.github.com/repos/octo/repo/pulls?page=3"
    )]
    #[case::unquoted_relation(
        "<https://api.github.com/repos/octo/repo/pulls?page=2>; rel=next",
        "https://api.github.com/repos/octo/repo/pulls?page=2"
    )]
    #[case::multiple_relations(
        "<https://api.github.com/repos/octo/repo/pulls?page=2>; rel=\"next last\"",
        "https://api.github.com/repos/octo/repo/pulls?page=2"
    )]
    #[case::relative_target("</repos/octo/repo/pulls?page=2>; rel=\"next\"",
        "https://api.github.com/repos/octo/repo/pulls?page=2"
    )]
    fn finds_next_relation(current: Url, #[case] link: &str, #[case] expected: &str) {
        let next = next_page_url(&with_link(link), &current).expect("link should parse");

        assert_eq!(next.map(String::from).as_deref(), Some(expected));
    }

    #[rstest]
    #[case::last_page(
        "<https://api.github.com/repos/octo/repo/pulls?page=1>; rel=\"first\", \
         <https://api.github.com/repos/octo/repo/pulls?page=4>; rel=\"prev\""
    )]
    #[case::empty_header("")]
    fn missing_next_relation_ends_listing(current: Url, #[case] link: &str) {
        let next = next_page_url(&with_link(link), &current).expect("link should parse");

        assert_eq!(next, None);
    }

    #[rstest]
    fn absent_header_ends_listing(current: Url) {
        let next = next_page_url(&HeaderMap::new(), &current).expect("no header is fine");

        assert_eq!(next, None);
    }

    #[rstest]
    fn unresolvable_next_link_is_an_error(current: Url) {
        let result = next_page_url(&with_link("<http://[::1>; rel=\"next\""), &current);

        assert!(
            matches!(result, Err(IngestError::InvalidUrl(_))),
            "expected InvalidUrl, got {result:?}"
        );
    }
}
