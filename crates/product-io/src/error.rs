//! Error types for product reading and writing.

use thiserror::Error;

/// Result type alias using ProductError.
pub type ProductResult<T> = Result<T, ProductError>;

/// Primary error type for product operations.
#[derive(Debug, Error)]
pub enum ProductError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a product file (bad magic)")]
    BadMagic,

    #[error("Unsupported product format version: {0}")]
    UnsupportedVersion(u16),

    #[error("Truncated product file: {0}")]
    Truncated(String),

    #[error("Band name is not valid UTF-8")]
    InvalidBandName,

    #[error("Duplicate band name: {0}")]
    DuplicateBand(String),

    #[error("Band '{0}' has zero extent")]
    EmptyBand(String),

    #[error("Band not found: {0}")]
    BandNotFound(String),

    #[error("Value out of range for container format: {0}")]
    OutOfRange(String),
}

impl ProductError {
    /// Whether this error describes malformed or missing data, as opposed
    /// to a failure of the underlying storage.
    pub fn is_data_error(&self) -> bool {
        !matches!(self, ProductError::Io(_))
    }
}
