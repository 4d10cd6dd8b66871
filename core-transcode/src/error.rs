//! # Transcode Error Types
//!
//! Error taxonomy for the virtual file core. Only construction failures
//! and mid-session fatal errors (allocation, encoder failure, corrupted
//! stream) cross the session boundary; malformed decode units are
//! absorbed with a warning and size-estimate drift is a diagnostic only.

use thiserror::Error;

/// Errors that can occur while constructing or reading a transcode session.
#[derive(Error, Debug)]
pub enum TranscodeError {
    // ========================================================================
    // Construction Errors (session never becomes usable)
    // ========================================================================
    /// The source file could not be opened or probed.
    #[error("Failed to open audio source: {0}")]
    SourceOpen(String),

    /// The source is not a usable stream (no audio track, zero sample rate).
    #[error("Unsupported or invalid audio stream: {0}")]
    InvalidStream(String),

    /// The source channel layout cannot be encoded (more than two channels).
    #[error("Unsupported channel layout: {0} channels")]
    UnsupportedLayout(u16),

    /// The encoder could not be configured.
    #[error("Failed to configure encoder: {0}")]
    EncoderInit(String),

    /// Tag mapping or rendering failed during construction.
    #[error("Tag rendering failed: {0}")]
    TagRender(#[from] core_tags::TagError),

    /// The session configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Mid-Session Fatal Errors (abort the current read)
    // ========================================================================
    /// The output buffer could not grow.
    #[error("Output buffer allocation failed: {0}")]
    Allocation(String),

    /// The encoder rejected a sample block or failed to flush.
    #[error("Encoding error: {0}")]
    Encode(String),

    /// The source stream is corrupted beyond best-effort recovery.
    #[error("Corrupted audio stream: {0}")]
    CorruptedStream(String),

    /// The decoder encountered an unrecoverable internal error.
    #[error("Decoder error: {0}")]
    Decoder(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscodeError {
    /// Returns `true` if this error prevents a session from ever
    /// becoming usable (an open failure, as opposed to a read failure).
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            TranscodeError::SourceOpen(_)
                | TranscodeError::InvalidStream(_)
                | TranscodeError::UnsupportedLayout(_)
                | TranscodeError::EncoderInit(_)
                | TranscodeError::TagRender(_)
                | TranscodeError::InvalidConfig(_)
        )
    }
}

/// Result type for transcode operations.
pub type Result<T> = std::result::Result<T, TranscodeError>;
