//! Error types for Landmark Hunt processing

use thiserror::Error;

/// Errors that can occur while processing session documents
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid filter value: {0}")]
    InvalidFilter(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
