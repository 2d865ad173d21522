//! Configuration error types.
//!
//! Defined as a typed enum so callers can `downcast_ref::<ConfigError>()` on
//! the `anyhow::Error` returned from a run and tell a broken setup apart from
//! everything else. Per-question backend failures never surface here; the
//! engine retries those internally.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors that stop a run before (or instead of) evaluating questions.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The dataset file could not be read.
    #[error("failed to read dataset {}: {source}", path.display())]
    DatasetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dataset file is not a valid `{ "questions": [...] }` document.
    #[error("failed to parse dataset {}: {source}", path.display())]
    DatasetParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The dataset contains no questions, so accuracy is undefined.
    #[error("dataset {} contains no questions", path.display())]
    EmptyDataset { path: PathBuf },

    /// `max_attempts` must allow at least one request per question.
    #[error("max_attempts must be at least 1")]
    InvalidMaxAttempts,
}
