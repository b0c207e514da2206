use thiserror::Error;

/// Errors from the AniList GraphQL client.
#[derive(Debug, Error)]
pub enum AniListError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("GraphQL error: {0}")]
    GraphQL(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl AniListError {
    /// Whether a repeated request could succeed: server errors, timeouts and
    /// connection failures.
    pub fn is_transient(&self) -> bool {
        match self {
            AniListError::Http(e) => e.is_timeout() || e.is_connect(),
            AniListError::Api { status, .. } => (500..=599).contains(status),
            AniListError::GraphQL(_) | AniListError::Parse(_) => false,
        }
    }
}
