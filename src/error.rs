//! Error taxonomy for the fetch pipeline.
//!
//! Three families: caller errors ([`Error::InvalidQuery`]) are raised
//! before any network call; permanent upstream errors
//! ([`Error::UpstreamRejected`]) abort a fetch immediately; transient
//! errors (network, 5xx, 429, malformed bodies) are retried per
//! [`crate::api::RetryPolicy`] and become [`Error::FetchExhausted`]
//! once the attempt budget for a page is used up.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad filter input (e.g. an empty indicator list), rejected
    /// before any network call.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The service refused the request with a non-retryable status
    /// (4xx other than 429), or reported an API-level error payload.
    #[error("upstream rejected request (HTTP {status}): {body}")]
    UpstreamRejected { status: u16, body: String },

    /// Connection failure, timeout or other transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Retryable HTTP status (5xx or 429).
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// Response body was not valid JSON.
    #[error("malformed body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Body was JSON but not the expected `[meta, data]` envelope.
    #[error("unexpected envelope: {0}")]
    Envelope(String),

    /// Retry budget for one page used up. Carries the failing page
    /// number and the last underlying cause.
    #[error("page {page} failed after {attempts} attempts: {cause}")]
    FetchExhausted {
        page: u32,
        attempts: u32,
        #[source]
        cause: Box<Error>,
    },
}

impl Error {
    /// Whether another attempt at the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) | Error::Decode(_) | Error::Envelope(_) => true,
            Error::Http { status } => *status >= 500 || *status == 429,
            Error::InvalidQuery(_) | Error::UpstreamRejected { .. } | Error::FetchExhausted { .. } => false,
        }
    }
}
