//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Errors that can occur when loading or validating a configuration document.
///
/// [`ParseError`](ConfigError::ParseError) is a malformed document; every other
/// variant is a validation failure. Either aborts the run before any output
/// is written.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The document content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing from the configuration.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A DUT source file listed in the configuration does not exist.
    #[error("DUT source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// An interface names a protocol with no template set or catalog entry.
    #[error("unsupported protocol '{protocol}': {reason}")]
    UnsupportedProtocol {
        /// The protocol tag as written in the document.
        protocol: String,
        /// Why the protocol cannot be used.
        reason: String,
    },

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Errors that can occur when loading the protocol signal catalog.
///
/// A missing catalog file is not an error; it yields an empty catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file exists but could not be read.
    #[error("failed to read protocol catalog: {0}")]
    IoError(#[from] std::io::Error),

    /// The catalog content could not be parsed.
    #[error("failed to parse protocol catalog: {0}")]
    ParseError(String),
}
