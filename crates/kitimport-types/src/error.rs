//! Error types for the import system

use std::path::PathBuf;
use thiserror::Error;

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;

/// Errors that can occur during import operations
#[derive(Error, Debug)]
pub enum ImportError {
    /// A persisted JSON payload could not be read or parsed
    #[error("Failed to read payload {path}: {reason}")]
    PayloadRead { path: PathBuf, reason: String },

    /// Manifest is missing required data or is malformed
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// Document factory refused to create a document (unknown type, storage error)
    #[error("Document creation failed: {0}")]
    DocumentCreation(String),

    /// Document rejected its payload
    #[error("Document import failed: {0}")]
    DocumentImport(String),

    /// Document import finished without yielding an identifier
    #[error("Document has no identifier after import")]
    MissingDocumentId,

    /// Global settings (kit) management error
    #[error("Kit error: {0}")]
    Kit(String),

    /// Referenced kit does not exist
    #[error("Kit not found: {0}")]
    KitNotFound(String),

    /// Asset upload failed
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Option/backup storage error
    #[error("Option store error: {0}")]
    OptionStore(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
