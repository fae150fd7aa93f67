//! Error types for the render crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by a [`Backend`](crate::Backend).
///
/// None of these are fatal to the UI: callers degrade to a safe default
/// (blank image, fallback font metrics, empty text) through the helpers in
/// [`backend`](crate::backend).
#[derive(Error, Debug)]
pub enum BackendError {
    /// An image or other asset could not be found.
    #[error("asset not found: {}", path.display())]
    AssetNotFound { path: PathBuf },

    /// An asset exists but could not be decoded.
    #[error("failed to decode asset {}: {message}", path.display())]
    AssetDecode { path: PathBuf, message: String },

    /// The requested font family is not available.
    #[error("font unavailable: {family}")]
    FontUnavailable { family: String },

    /// The system clipboard could not be accessed.
    #[error("clipboard unavailable")]
    ClipboardUnavailable,

    /// The surface id does not refer to a live surface.
    #[error("unknown surface {0:?}")]
    UnknownSurface(crate::backend::SurfaceId),

    /// Invalid surface dimensions (zero width or height).
    #[error("invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Any other surface failure (lost context, capture failure).
    #[error("surface error: {0}")]
    Surface(String),

    /// Underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
