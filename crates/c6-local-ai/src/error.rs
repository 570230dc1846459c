//! Error types for local AI operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while managing artifacts or running inference.
#[derive(Debug, Error)]
pub enum LocalAIError {
    /// The user's home directory could not be determined.
    #[error("cannot get user home directory")]
    HomeDirNotFound,

    /// Failed to create the directory that holds an artifact.
    #[error("cannot create directory {path}: {source}")]
    DataDirCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP request could not be completed.
    #[error("cannot download {name}: {source}")]
    DownloadFailed {
        name: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status code.
    #[error("cannot download {name}, got HTTP status code {status}")]
    HttpStatus {
        name: String,
        status: reqwest::StatusCode,
    },

    /// The response body was not a valid gzip stream.
    #[error("cannot decompress {name}: {source}")]
    DecompressFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the temporary file failed.
    #[error("cannot write to file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Checksum verification failed.
    #[error("{name} checksum mismatch. Expected: {expected}, got: {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// Moving the temporary file into place failed.
    #[error("cannot move {name} to {path}: {source}")]
    RenameFailed {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another update holds the lock.
    #[error("another update is in progress (remove {0} if it is stale)")]
    UpdateInProgress(PathBuf),

    /// The model could not be loaded.
    #[error("cannot load model {path}: {reason}")]
    ModelLoadFailed { path: PathBuf, reason: String },

    /// The prediction call failed.
    #[error("prediction failed: {0}")]
    PredictionFailed(String),

    /// The prompt does not fit into the context window.
    #[error("prompt of {tokens} tokens does not fit the context window of {context} tokens")]
    ContextOverflow { tokens: usize, context: u32 },

    /// This build has no inference backend compiled in.
    #[error("c6 was built without llama.cpp support")]
    BackendUnavailable,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
