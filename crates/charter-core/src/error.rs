//! Error types for the Charter core library

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while talking to the drafting service
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network failure or request construction error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body failed while being read
    #[error("Failed to read response stream: {0}")]
    Read(String),

    /// Feedback endpoint did not acknowledge the submission
    #[error("Feedback rejected: {0}")]
    Feedback(String),

    /// Base URL or endpoint could not be joined into a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors raised by result persistence
#[derive(Error, Debug)]
pub enum StorageError {
    /// Key would escape the store directory or is otherwise unusable
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Filesystem failure
    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised when handing off to the result viewer
#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("Unknown destination: {0}")]
    UnknownDestination(String),

    /// Destination expects a persisted value that is not there
    #[error("Nothing stored under key {0:?}")]
    Missing(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Viewer could not write its output
    #[error("Failed to render result: {0}")]
    Render(#[from] std::io::Error),
}

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Result alias for transport operations
pub type ClientResult<T> = Result<T, ClientError>;
