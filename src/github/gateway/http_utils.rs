//! Shared HTTP utilities for gateway implementations.

pub(super) fn extract_github_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return None;
    };
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}

/// Picks the human-readable part of an error body.
pub(super) fn rejection_message(body: &str) -> String {
    extract_github_message(body).unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "no response body".to_owned()
        } else {
            trimmed.to_owned()
        }
    })
}
