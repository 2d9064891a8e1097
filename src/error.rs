//! Error types for gramfeed.

use thiserror::Error;

/// Common error type for the ingestion pipeline and the post store.
#[derive(Error, Debug)]
pub enum GramfeedError {
    /// I/O error (store file, channel file, log file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store document could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level failure talking to a feed host.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed host answered with a non-2xx status.
    #[error("failed to fetch RSS feed: {0}")]
    FeedStatus(u16),

    /// The channel file contains no recognised feed URLs.
    #[error("no RSS feed URLs are configured")]
    NoFeedSources,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for gramfeed operations.
pub type Result<T> = std::result::Result<T, GramfeedError>;
