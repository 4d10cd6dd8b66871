//! # Tag Error Types

use thiserror::Error;

/// Errors that can occur while mapping or rendering tags.
#[derive(Error, Debug)]
pub enum TagError {
    /// The ID3v2 frame set could not be serialized.
    #[error("Failed to render ID3v2 tag: {0}")]
    Render(#[from] id3::Error),

    /// I/O error while writing rendered bytes.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tag operations.
pub type Result<T> = std::result::Result<T, TagError>;
