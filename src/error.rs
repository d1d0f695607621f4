//! Error types for bikeshare-explorer.

use std::path::PathBuf;

use thiserror::Error;

/// A prompt answer that is not a member of the accepted set.
///
/// The `Display` text is the message shown before re-prompting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInputError {
    #[error("Not a valid city. Please choose between Chicago, New York City or Washington")]
    City(String),

    #[error("Not a valid choice. Choose a month or 'all' for no filter.")]
    Month(String),

    #[error("Not a valid choice. Choose a day or 'all' for no filter.")]
    Day(String),
}

/// Errors raised while loading a city's trip records.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// No data file exists for the city
    #[error("data file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// File extension we have no reader for
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// I/O error while reading the file
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// The JSON document is not an array of objects
    #[error("invalid JSON layout: {0}")]
    JsonLayout(String),

    /// A required column is absent from the header
    #[error("missing required column '{column}'")]
    MissingColumn { column: &'static str },

    /// A required cell is empty or cannot be parsed
    #[error("row {row}: invalid value {value:?} in column '{column}'")]
    Malformed {
        row: usize,
        column: &'static str,
        value: String,
    },
}
