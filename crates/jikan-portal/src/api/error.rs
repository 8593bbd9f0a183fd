//! Failure taxonomy for a single API request.

use thiserror::Error;

/// Why one GET against the metadata API produced no usable body.
///
/// None of these are retried; the caller converts them into an in-container
/// message.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS or timeout failure
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Non-success HTTP status
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Body was not the JSON shape we expect
    #[error("response from {url} could not be parsed: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Detail endpoint answered without a `data` object
    #[error("response from {url} carried no data")]
    MissingData { url: String },
}

impl FetchError {
    /// True when the API reported that the record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 404, .. })
    }

    /// URL of the failed request
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Decode { url, .. }
            | FetchError::MissingData { url } => url,
        }
    }
}
