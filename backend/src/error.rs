//! Error types for the Salestar ETL pipeline.
//!
//! Only I/O-level problems are errors here. Data-quality problems in the
//! sales rows (bad dates, non-numeric measures, missing keys) are resolved
//! by coercion or row dropping in [`crate::transform::normalize`] and are
//! reported through [`crate::models::NormalizeStats`], never through these
//! types.
//!
//! - [`LoadError`] - Reading and decoding the raw source
//! - [`WriteError`] - Writing the output tables and manifest
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Loader Errors
// =============================================================================

/// Errors while loading the raw sales source. All of them are fatal.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Source missing or unreadable.
    #[error("Cannot read source '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Delimiter must be a single ASCII character.
    #[error("Unsupported delimiter '{0}' (must be ASCII)")]
    InvalidDelimiter(char),

    /// Malformed CSV framing.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// No header line.
    #[error("Source is empty (no header row)")]
    EmptyFile,
}

// =============================================================================
// Writer Errors
// =============================================================================

/// Errors while persisting the star schema.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Output directory could not be prepared or a file could not be opened.
    #[error("Output IO error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization failed.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Manifest serialization failed.
    #[error("Manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading the source failed.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Writing the outputs failed.
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// A background build task panicked or was cancelled.
    #[error("Build task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for writer operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
