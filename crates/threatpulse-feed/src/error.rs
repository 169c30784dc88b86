/// Errors that can occur when fetching from the vulnerability feed.
///
/// Every variant is fatal to the pipeline run that hit it; retry policy
/// belongs to the scheduler, not to the client.
///
/// # Examples
///
/// ```rust
/// use threatpulse_feed::error::FeedError;
///
/// let err = FeedError::Http { status: 503, body: "service unavailable".to_string() };
/// assert!(err.to_string().contains("503"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Non-2xx status code from the feed API.
    #[error("NVD API HTTP error: status={status}, body={body}")]
    Http { status: u16, body: String },

    /// An underlying HTTP transport error from `reqwest` (includes timeouts).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The feed returned a 2xx status but the body is not valid feed JSON.
    #[error("Malformed feed response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias so callers can write `error::Result<T>`.
pub type Result<T> = std::result::Result<T, FeedError>;
