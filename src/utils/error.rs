// src/utils/error.rs
use thiserror::Error;

// Errors raised while fetching pages from the wiki
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error {0} for {1}")]
    Http(reqwest::StatusCode, String),

    #[error("Rate limit likely exceeded for {0}")]
    RateLimited(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Invalid URL '{0}': {1}")]
    InvalidUrl(String, String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::SerializationError(e.to_string())
    }
}

// Errors from the plot rewriting service
#[derive(Error, Debug)]
pub enum AnonymizeError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rewrite API returned {0}: {1}")]
    Http(reqwest::StatusCode, String),

    #[error("Malformed rewrite response: {0}")]
    MalformedResponse(String),

    #[error("Rewrite API returned an empty plot")]
    EmptyRewrite,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Fetching failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Anonymization failed: {0}")]
    Anonymize(#[from] AnonymizeError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
