//! Error types for the viewer core.
//!
//! All of these are recovered at the component boundary that detects them and
//! reported upward as state; none of them should take the host process down.

use thiserror::Error;

/// Errors surfaced by the store, the ingestion pipeline and the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewerError {
    /// Upload rejected before any stage ran
    #[error("Please upload a valid image file (JPG, PNG, DICOM): {file} ({reason})")]
    Validation {
        /// Name of the rejected file
        file: String,
        /// Why it was rejected
        reason: String,
    },

    /// An image layer could not be fetched or decoded
    #[error("Error loading image {url}: {message}")]
    ImageLoad {
        /// Image reference that failed
        url: String,
        /// Loader message
        message: String,
    },

    /// Requested case is not in the store
    #[error("Case not found: {id}")]
    NotFound {
        /// The missing case id
        id: String,
    },

    /// A case with the same id is already stored
    #[error("Case already exists: {id}")]
    DuplicateCase {
        /// The conflicting case id
        id: String,
    },

    /// Unexpected failure while running the ingestion pipeline
    #[error("Ingestion failed: {0}")]
    Ingestion(String),
}

impl ViewerError {
    /// Create a validation error.
    pub fn validation(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create an image load error.
    pub fn image_load(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ImageLoad {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}
