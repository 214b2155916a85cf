use seasonwatch_sources::SourceError;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("fetch episode info: {0}")]
    Fetch(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("a check is already in progress")]
    CheckInProgress,

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl TrackerError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, TrackerError::Store(StoreError::AlreadyExists { .. }))
    }
}
