//! Error types for the export pipeline.
//!
//! This module defines the error hierarchy:
//!
//! - [`IngestError`] - reading and decoding external CSV input
//! - [`ExportError`] - top-level pipeline errors, including validation failure
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries. Validation findings are
//! not errors by themselves: the validator always returns a report, and
//! only [`crate::pipeline::generate`] turns fatal findings into
//! [`ExportError::ValidationFailed`].

use crate::validation::ValidationReport;
use thiserror::Error;

// =============================================================================
// Ingest Errors
// =============================================================================

/// Errors while reading an externally authored CSV file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to detect or decode the encoding.
    #[error("Failed to decode input: {0}")]
    EncodingError(String),

    /// Invalid CSV structure.
    #[error("Invalid CSV format: {0}")]
    ParseError(#[from] csv::Error),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Export Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the main error type returned by [`crate::pipeline::generate`].
#[derive(Debug, Error)]
pub enum ExportError {
    /// The batch carries fatal validation errors; the full report is
    /// attached so callers can surface every finding.
    #[error("validation failed with {} fatal error(s)", report.fatal_errors.len())]
    ValidationFailed { report: ValidationReport },

    /// Ingest error.
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Nothing to export.
    #[error("No campaigns to export")]
    EmptyInput,
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for ingest operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
