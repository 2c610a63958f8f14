//! Error types for asset decoding and engine entry

use thiserror::Error;

/// Errors that can occur while decoding brush/paper assets
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Truncated pixel data: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors returned by the painting engine entry point
#[derive(Error, Debug)]
pub enum PaintError {
    /// A paint invocation is already in flight on this engine.
    #[error("engine is busy with another paint invocation")]
    Busy,

    #[error("asset failed to load: {0}")]
    Load(#[from] LoadError),
}
