//! # Growable Output Buffer
//!
//! Append-only byte store for the virtual file's produced content. The
//! buffer exposes a two-phase write contract: `ensure_capacity` returns
//! a writable spare region, `commit` advances the produced high-water
//! mark after the caller has filled it. This lets the encoder write
//! straight into the buffer without an intermediate copy.
//!
//! The produced cursor only ever increases, except for the single
//! drift-correction clamp the session applies at finalize time.

use crate::error::{Result, TranscodeError};
use std::mem::MaybeUninit;

/// Append-only byte buffer with a produced high-water mark.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer pre-sized for an expected total length.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Number of valid bytes from offset 0.
    pub fn produced(&self) -> usize {
        self.data.len()
    }

    /// Grow the backing storage so `additional` more bytes fit, and
    /// return the writable region. Existing bytes are preserved.
    ///
    /// Allocation failure is reported as a fatal error rather than an
    /// abort, so the session can surface it as an I/O failure.
    pub fn ensure_capacity(&mut self, additional: usize) -> Result<&mut [MaybeUninit<u8>]> {
        self.data
            .try_reserve(additional)
            .map_err(|e| TranscodeError::Allocation(e.to_string()))?;
        Ok(&mut self.data.spare_capacity_mut()[..additional])
    }

    /// Advance the produced cursor by `len` bytes.
    ///
    /// The caller must have written `len` bytes into the region returned
    /// by the preceding `ensure_capacity` call.
    pub fn commit(&mut self, len: usize) {
        debug_assert!(self.data.len() + len <= self.data.capacity());
        // The region was initialized by the caller per the two-phase
        // write contract.
        unsafe {
            self.data.set_len(self.data.len() + len);
        }
    }

    /// Append already-materialized bytes (tag renderings, the trailer).
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.data
            .try_reserve(bytes.len())
            .map_err(|e| TranscodeError::Allocation(e.to_string()))?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Copy out `[offset, offset + len)`.
    ///
    /// Requires `offset + len <= produced()`; the caller clamps first.
    pub fn read_at(&self, offset: usize, len: usize) -> &[u8] {
        &self.data[offset..offset + len]
    }

    /// Force the produced cursor to exactly `target`, truncating or
    /// zero-extending as needed. Used only for the finalize drift clamp.
    pub fn clamp_produced(&mut self, target: usize) -> Result<()> {
        if target <= self.data.len() {
            self.data.truncate(target);
        } else {
            self.data
                .try_reserve(target - self.data.len())
                .map_err(|e| TranscodeError::Allocation(e.to_string()))?;
            self.data.resize(target, 0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_phase_write() {
        let mut buffer = OutputBuffer::new();
        let region = buffer.ensure_capacity(4).unwrap();
        assert_eq!(region.len(), 4);
        for (i, slot) in region.iter_mut().enumerate() {
            slot.write(i as u8);
        }
        buffer.commit(4);

        assert_eq!(buffer.produced(), 4);
        assert_eq!(buffer.read_at(0, 4), &[0, 1, 2, 3]);
    }

    #[test]
    fn partial_commit_after_oversized_reserve() {
        let mut buffer = OutputBuffer::new();
        let region = buffer.ensure_capacity(100).unwrap();
        region[0].write(0xAA);
        region[1].write(0xBB);
        buffer.commit(2);

        assert_eq!(buffer.produced(), 2);
        assert_eq!(buffer.read_at(0, 2), &[0xAA, 0xBB]);
    }

    #[test]
    fn append_preserves_existing_bytes() {
        let mut buffer = OutputBuffer::new();
        buffer.append(&[1, 2, 3]).unwrap();
        buffer.append(&[4, 5]).unwrap();
        assert_eq!(buffer.produced(), 5);
        assert_eq!(buffer.read_at(0, 5), &[1, 2, 3, 4, 5]);
        assert_eq!(buffer.read_at(3, 2), &[4, 5]);
    }

    #[test]
    fn produced_is_monotonic_across_writes() {
        let mut buffer = OutputBuffer::new();
        let mut last = 0;
        for chunk in [&[1u8, 2][..], &[3][..], &[4, 5, 6][..]] {
            buffer.append(chunk).unwrap();
            assert!(buffer.produced() > last);
            last = buffer.produced();
        }
    }

    #[test]
    fn clamp_truncates_or_zero_extends() {
        let mut buffer = OutputBuffer::new();
        buffer.append(&[9; 10]).unwrap();

        buffer.clamp_produced(6).unwrap();
        assert_eq!(buffer.produced(), 6);
        assert_eq!(buffer.read_at(0, 6), &[9; 6]);

        buffer.clamp_produced(8).unwrap();
        assert_eq!(buffer.produced(), 8);
        assert_eq!(buffer.read_at(6, 2), &[0, 0]);
    }
}
