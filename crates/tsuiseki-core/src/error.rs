use thiserror::Error;
use tsuiseki_api::ListStatus;

#[derive(Debug, Error)]
pub enum SyncError {
    /// No title anywhere in the path. Carries the tagger output for diagnosis.
    #[error("couldn't find a title in {path} (tagger output: {guess})")]
    Parse { path: String, guess: String },

    #[error("{0}")]
    NotInList(String),

    #[error("episode {observed} was not new (list progress is {current})")]
    NotNew { observed: u32, current: u32 },

    /// `None` when the entry has progress but the service reported no status.
    #[error("entry status {} doesn't allow progress updates", status_label(.0))]
    NotModifiable(Option<ListStatus>),

    #[error("API error: {0}")]
    Api(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    pub(crate) fn api(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        SyncError::Api(Box::new(err))
    }

    /// Refusals that are part of normal operation rather than failures.
    pub fn is_benign(&self) -> bool {
        matches!(self, SyncError::NotNew { .. })
    }
}

fn status_label(status: &Option<ListStatus>) -> String {
    status.map_or_else(|| "unknown".to_string(), |s| s.to_string())
}
