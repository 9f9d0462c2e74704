//! Error types for the doodleboard application.
//!
//! This module defines custom error types that categorize different failures
//! that can occur during board operations. Benign caller mistakes (deleting
//! the default folder, referencing a missing card) are not errors at all;
//! the store treats those as silent no-ops.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the doodleboard application.
#[derive(Error, Debug)]
pub enum BoardError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors related to zip operations.
    #[error("Zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Card was not found when performing an operation that requires it.
    #[error("Card not found: {id}")]
    CardNotFound { id: String },

    /// The uploaded archive could not be opened or read at all.
    #[error("Archive import failed: {message}")]
    ArchiveFailed { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// The genie (AI) collaborator failed or timed out.
    #[error("Genie unavailable: {message}")]
    GenieUnavailable { message: String },

    /// Invalid import/export source or format.
    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },

    /// Launching or running the external editor failed.
    #[error("{message}")]
    EditorError { message: String },
}
