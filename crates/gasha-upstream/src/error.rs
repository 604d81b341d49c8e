use thiserror::Error;

/// Errors returned by [`crate::ShopSearchClient`].
///
/// None of these are retried; callers surface them as "upstream unavailable".
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body was not JSON.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid upstream base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
