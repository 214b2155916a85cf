use thiserror::Error;

/// Failure to obtain episode details for a season page
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("unexpected status code {status} from {url}")]
    Status { status: u16, url: String },

    #[error("failed to parse episode page: {0}")]
    Parse(String),
}
