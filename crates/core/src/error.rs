//! Error types for session-to-slide synchronization.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while syncing a session record into a slide.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read a local file (config, record export, snapshot).
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// A JSON document could not be decoded.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The slide to update does not exist in the presentation.
    #[error("Slide with id {0} not found")]
    SlideNotFound(String),

    /// The slide to update has no page elements at all.
    #[error("No page elements found on slide {0}")]
    NoPageElements(String),

    /// The slide to update carries no table element.
    #[error("No table element found on slide {0}")]
    TableNotFound(String),

    /// The record store could not be read or queried.
    #[error("Record source error: {0}")]
    RecordSource(String),

    /// The presentation service rejected a request or could not be reached.
    #[error("Slides service error: {0}")]
    Service(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error means the target slide lacks the structure a batch needs.
    ///
    /// These failures are final for the record; re-running without fixing the
    /// deck yields the same result.
    pub fn is_missing_structure(&self) -> bool {
        matches!(
            self,
            Error::SlideNotFound(_) | Error::NoPageElements(_) | Error::TableNotFound(_)
        )
    }
}
