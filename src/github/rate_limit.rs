//! Rate limit information from GitHub API responses.
//!
//! GitHub reports quota state on every response through the
//! `X-RateLimit-Limit`, `X-RateLimit-Remaining` and `X-RateLimit-Reset`
//! headers. A `403 Forbidden` whose remaining quota is zero means the request
//! can be retried unchanged once the reset time has passed.

use http::HeaderMap;

/// Header carrying the number of requests left in the current window.
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
/// Header carrying the epoch second at which the window resets.
pub const RESET_HEADER: &str = "x-ratelimit-reset";
/// Header carrying the window size.
pub const LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Rate limit information extracted from GitHub API response headers.
///
/// # Example
///
/// ```
/// use tallyman::github::rate_limit::RateLimitInfo;
///
/// let info = RateLimitInfo::new(Some(5000), 0, 1_700_000_005);
/// assert!(info.is_exhausted());
/// assert_eq!(info.seconds_until_reset(1_700_000_000), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Maximum requests allowed in the current window, when reported.
    limit: Option<u32>,
    /// Remaining requests in the current window.
    remaining: u32,
    /// Unix timestamp when the rate limit resets.
    reset_at: u64,
}

impl RateLimitInfo {
    /// Creates a new rate limit info instance.
    #[must_use]
    pub const fn new(limit: Option<u32>, remaining: u32, reset_at: u64) -> Self {
        Self {
            limit,
            remaining,
            reset_at,
        }
    }

    /// Reads rate limit headers from a response.
    ///
    /// Returns `None` unless both the remaining-quota and reset headers are
    /// present and numeric; a partial signal is not enough to schedule a
    /// retry.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let remaining = header_number::<u32>(headers, REMAINING_HEADER)?;
        let reset_at = header_number::<u64>(headers, RESET_HEADER)?;
        let limit = header_number::<u32>(headers, LIMIT_HEADER);
        Some(Self::new(limit, remaining, reset_at))
    }

    /// Returns the maximum requests allowed in the current window.
    #[must_use]
    pub const fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Returns true if the rate limit has been exhausted.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Seconds from `now_unix` until the window reopens, never negative.
    #[must_use]
    pub const fn seconds_until_reset(&self, now_unix: u64) -> u64 {
        self.reset_at.saturating_sub(now_unix)
    }
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.trim().parse::<T>().ok())
}
