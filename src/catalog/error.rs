//! Error types for level data loading.

use thiserror::Error;

/// Errors that can occur when reading level descriptors, sidecars or rotation files.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// File could not be found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// The document is not well-formed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },

    /// The level was exported by a build that is known to produce broken data.
    #[error("Level '{path}' was exported by incompatible build {build}")]
    IncompatibleBuild { path: String, build: u32 },
}
