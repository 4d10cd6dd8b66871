//! # Decode Adapter
//!
//! Pull-style FLAC decoding built on Symphonia.
//!
//! Opening the adapter probes the container and captures the stream
//! properties and tag dictionary up front; the session then pulls one
//! decoded sample block per call, strictly forward.
//!
//! ```text
//! path → MediaSourceStream → FormatReader → Decoder → interleaved f32
//! ```

mod flac;
mod sample_converter;

pub use flac::FlacDecodeAdapter;
pub use sample_converter::SampleConverter;
