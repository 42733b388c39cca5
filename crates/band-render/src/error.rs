//! Error types for rendering and image writing.

use thiserror::Error;

/// Result type alias using RenderError.
pub type RenderResult<T> = Result<T, RenderError>;

/// Primary error type for rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Requested format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Image encoding failed: {0}")]
    Encode(String),

    #[error("Band '{0}' has no attached render info")]
    MissingImageInfo(String),

    #[error("Palette has no control points")]
    EmptyPalette,

    #[error("Band dimensions do not match: {0}")]
    BandMismatch(String),
}

impl RenderError {
    /// Whether this error describes bad input data, as opposed to a
    /// failure of encoding or storage.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            RenderError::MissingImageInfo(_)
                | RenderError::EmptyPalette
                | RenderError::BandMismatch(_)
        )
    }
}
