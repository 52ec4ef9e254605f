//! Error handling for the diversion engine.
//!
//! Configuration problems (missing columns, unusable types, bad settings)
//! are hard errors. Data-quality findings that the engine can work around
//! (skipped rows, ambiguous names, degenerate cells) are reported through
//! the `log` facade and the run report instead.

use std::io;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Errors that can occur while preparing or running a diversion analysis
#[derive(Debug, thiserror::Error)]
pub enum DiversionError {
    /// A required input column is absent from the batch
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A required column exists but holds an unusable data type
    #[error("Column '{column}' is not a supported {expected} column")]
    InvalidDataType {
        /// Name of the offending column
        column: String,
        /// What the column was expected to hold
        expected: String,
    },

    /// The engine configuration itself is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Arrow error
    #[error("Arrow error: {0}")]
    ArrowError(#[from] ArrowError),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    ParquetError(#[from] ParquetError),

    /// Error opening or reading a file
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type for diversion operations
pub type Result<T> = std::result::Result<T, DiversionError>;
