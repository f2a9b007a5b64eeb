//! Error types for dataset loading

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dataset loading
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors that can occur while loading the analysis document.
///
/// A load error is terminal for a session: the engine is never built from a
/// document that failed to load.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Analysis document not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read analysis document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in analysis document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Analysis document does not match the expected schema: {0}")]
    Schema(String),
}
