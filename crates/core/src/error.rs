use std::path::PathBuf;
use thiserror::Error;

/// Failures of the session-scoped key/value store.
///
/// Callers in the capture path never surface these; they log and degrade to
/// "nothing captured".
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Session store unavailable: {0}")]
    Unavailable(String),

    #[error("Session store lock poisoned")]
    Poisoned,

    #[error("Corrupt value under {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Failed to load config from {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
