use thiserror::Error;

/// Why a single feed produced nothing. Never fatal for the run as a whole.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} when fetching {url}")]
    Status { status: u16, url: String },

    #[error("reading fixture failed: {0}")]
    Fixture(#[from] std::io::Error),

    #[error("failed to parse RSS feed: {0}")]
    Parse(String),
}
