//! Error mapping helpers for the `reqwest` GitHub source.

use crate::github::error::IngestError;

pub(super) fn map_transport_error(operation: &str, error: &reqwest::Error) -> IngestError {
    if error.is_timeout() {
        return IngestError::Timeout {
            message: format!("{operation} timed out twice: {error}"),
        };
    }

    if error.is_decode() || error.is_body() {
        return IngestError::Decode {
            message: format!("{operation} failed: {error}"),
        };
    }

    IngestError::Network {
        message: format!("{operation} failed: {error}"),
    }
}

pub(super) fn map_decode_error(operation: &str, error: &serde_json::Error) -> IngestError {
    IngestError::Decode {
        message: format!("{operation} returned an unexpected body: {error}"),
    }
}
