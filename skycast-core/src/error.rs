use reqwest::StatusCode;
use thiserror::Error;

/// Failure modes of a forecast fetch. The dashboard collapses all of
/// them into one user-facing message; the variants exist for logs and
/// for callers that want to match.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("forecast request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid timestamp in provider response: {0}")]
    Timestamp(#[from] chrono::ParseError),
}
