//! Error types for bundle operations.

use thiserror::Error;

/// Errors that can occur while assembling or reading an XCFramework.
#[derive(Debug, Error)]
pub enum BundleError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Property list parsing or serialization error.
    #[error("Property list error: {0}")]
    Plist(#[from] plist::Error),

    /// Manifest validation error.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// Two platforms resolved to the same library slot.
    #[error("Duplicate library identifier: {0}")]
    DuplicateIdentifier(String),

    /// Static library file not found.
    #[error("Library not found: {0}")]
    LibraryNotFound(String),

    /// Architecture detection could not run.
    #[error("Architecture probe failed for {path}: {message}")]
    ArchitectureProbe { path: String, message: String },
}
