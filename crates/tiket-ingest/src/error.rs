//! Error types for artifact and job ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading pipeline inputs.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file does not exist.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Parsing Errors ===
    /// File content is not valid JSON for the expected type.
    #[error("failed to parse {kind} from {path}: {source}")]
    Json {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // === Discovery Errors ===
    /// None of the given paths yielded an artifact file.
    #[error("no artifact files found in the provided paths")]
    NoArtifacts,
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
