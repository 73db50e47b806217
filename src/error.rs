use std::path::PathBuf;

use crate::models::report::{ApplyOutcome, UndoReport};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{op} failed for {}: {source}", .path.display())]
    Filesystem {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Malformed plan: {0}")]
    MalformedPlan(String),

    #[error("Model service error: {0}")]
    Model(String),

    #[error("Operation in progress: {0}")]
    Busy(String),

    #[error("{0}")]
    General(String),
}

impl AppError {
    pub fn filesystem(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Fatal failure while applying a plan. `partial` holds everything completed
/// before the failure and its batch can still be undone.
#[derive(Debug, thiserror::Error)]
#[error("apply aborted after {} move(s): {source}", .partial.moved())]
pub struct ApplyError {
    #[source]
    pub source: AppError,
    pub partial: ApplyOutcome,
}

/// Fatal failure while undoing a batch.
#[derive(Debug, thiserror::Error)]
#[error("undo aborted after {} restore(s): {source}", .partial.restored)]
pub struct UndoError {
    #[source]
    pub source: AppError,
    pub partial: UndoReport,
}
