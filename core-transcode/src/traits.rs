//! # Core Transcode Traits
//!
//! The seams between the session state machine and its codec
//! collaborators. The session only ever pulls: one decoded sample block
//! at a time from the [`DecodeAdapter`], and encoded bytes written
//! directly into buffer spare capacity by the [`EncodeAdapter`].
//!
//! Both adapters are inherently sequential; the session is the unit of
//! concurrency and serializes access to them.

use crate::error::Result;
use core_tags::SourceTags;
use std::mem::MaybeUninit;

/// Immutable numeric properties of the source audio stream.
///
/// Produced once when the decode adapter opens the source, before any
/// sample block is returned. A zero sample rate never reaches this type;
/// it is rejected as a construction error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamProperties {
    /// Sample rate in Hz, always nonzero.
    pub sample_rate: u32,
    /// Number of audio channels (1 or 2).
    pub channels: u16,
    /// Total samples per channel in the stream.
    pub total_samples: u64,
    /// Bits per sample in the source, if declared.
    pub bits_per_sample: Option<u32>,
}

impl StreamProperties {
    /// Stream duration in whole milliseconds (integer truncation).
    pub fn duration_ms(&self) -> u64 {
        self.total_samples * 1000 / self.sample_rate as u64
    }
}

/// Pull-style interface over the source-format decoder.
///
/// Stream properties and the source tag dictionary are captured at open
/// time, before the first sample block; `next_block` then yields decoded
/// units strictly in forward order.
pub trait DecodeAdapter: Send {
    /// Numeric stream properties, available from construction.
    fn properties(&self) -> &StreamProperties;

    /// Source tag dictionary, available from construction.
    fn tags(&self) -> &SourceTags;

    /// Decode the next unit of the stream.
    ///
    /// Returns interleaved f32 samples in `[-1.0, 1.0]`, or `Ok(None)`
    /// at end of stream. Malformed units are skipped with a warning;
    /// only unrecoverable failures surface as errors.
    fn next_block(&mut self) -> Result<Option<Vec<f32>>>;
}

/// Push-style interface over the target-format encoder.
///
/// Encoded output is written into caller-provided spare capacity so the
/// session can grow its output buffer once and commit exactly the bytes
/// produced.
pub trait EncodeAdapter: Send {
    /// Worst-case encoded size for a block of `frames` sample frames.
    ///
    /// Callers size the output region from this before `encode_into`.
    fn worst_case_len(&self, frames: usize) -> usize;

    /// Encode one block of interleaved f32 samples into `out`.
    ///
    /// Returns the number of bytes written. `out` must be at least
    /// `worst_case_len` for the block's frame count.
    fn encode_into(&mut self, samples: &[f32], out: &mut [MaybeUninit<u8>]) -> Result<usize>;

    /// Flush remaining buffered encoder output into `out`.
    ///
    /// Called exactly once, at end of stream. Returns bytes written.
    fn flush_into(&mut self, out: &mut [MaybeUninit<u8>]) -> Result<usize>;
}
