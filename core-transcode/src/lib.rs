//! # Virtual Transcode Core
//!
//! Presents a FLAC file as a virtual, randomly-readable MP3 file. The
//! MP3 bytes are never written to persistent storage: a session drives a
//! decode→encode pipeline strictly forward, only as far as each byte
//! range read requires, and caches everything already produced.
//!
//! ## Overview
//!
//! - [`VirtualFile`]: the caller-facing surface. Open a source path,
//!   query the (stable) total size, read arbitrary byte ranges.
//! - [`TranscodeSession`]: the state machine behind it. Size estimation
//!   at construction, forward-fill on demand, a fast path for reads of
//!   the trailing 128-byte legacy tag, and a finalize step that corrects
//!   estimate drift.
//! - [`DecodeAdapter`] / [`EncodeAdapter`]: the seams to the codec
//!   collaborators (symphonia for FLAC, LAME for MP3).
//!
//! The total size reported at open time never changes; the trailer tag
//! always lands exactly 128 bytes before that size.

pub mod buffer;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod session;
pub mod traits;
pub mod virtual_file;

pub use buffer::OutputBuffer;
pub use config::TranscodeConfig;
pub use decoder::FlacDecodeAdapter;
pub use encoder::LameEncodeAdapter;
pub use error::{Result, TranscodeError};
pub use session::{SessionState, TranscodeSession};
pub use traits::{DecodeAdapter, EncodeAdapter, StreamProperties};
pub use virtual_file::VirtualFile;
