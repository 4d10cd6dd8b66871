//! # Sample Format Converter
//!
//! Normalizes decoded audio to interleaved f32 in `[-1.0, 1.0]`.
//!
//! FLAC sources decode to integer buffers of varying width; the session
//! and encoder only deal in f32. The converter owns a reusable sample
//! buffer sized from the first block so steady-state decoding does not
//! allocate per unit.

use symphonia::core::audio::{AudioBufferRef, SampleBuffer};

/// Converts Symphonia audio buffers to interleaved f32 samples.
#[derive(Default)]
pub struct SampleConverter {
    buf: Option<SampleBuffer<f32>>,
}

impl SampleConverter {
    /// Create a converter with no backing buffer yet; storage is sized
    /// lazily from the first decoded block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a decoded buffer to interleaved f32 samples.
    ///
    /// The returned slice is valid until the next conversion.
    pub fn to_interleaved_f32(&mut self, decoded: AudioBufferRef<'_>) -> &[f32] {
        let spec = *decoded.spec();
        let needed = decoded.capacity() * spec.channels.count();

        if self.buf.as_ref().map_or(true, |buf| buf.capacity() < needed) {
            self.buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }

        let buf = self
            .buf
            .get_or_insert_with(|| SampleBuffer::new(decoded.capacity() as u64, spec));
        buf.copy_interleaved_ref(decoded);
        buf.samples()
    }
}
