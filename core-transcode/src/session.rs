//! # Transcode Session
//!
//! State machine for one virtual MP3 file. A session computes its total
//! byte size at construction time, before a single sample is encoded, so
//! the virtual file can present a stable stat size. Reads then drive the
//! decode and encode pipeline forward only as far as the requested range
//! requires; bytes already produced are served straight from the output
//! buffer.
//!
//! Layout of the virtual file:
//!
//! ```text
//! [ ID3v2.4 header ][ CBR MP3 audio (estimated) ][ ID3v1 trailer, 128 B ]
//! ```
//!
//! The audio span is an estimate; at end of stream the produced cursor is
//! clamped to `total_size - 128` so the trailer always lands at the
//! advertised offset.

use crate::buffer::OutputBuffer;
use crate::config::TranscodeConfig;
use crate::decoder::FlacDecodeAdapter;
use crate::encoder::LameEncodeAdapter;
use crate::error::Result;
use crate::traits::{DecodeAdapter, EncodeAdapter};
use core_tags::{render_frames, render_legacy, TagMapper, LEGACY_TAG_LEN};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Sample frames per MP3 frame (MPEG-1 Layer III).
const SAMPLES_PER_FRAME: u64 = 1152;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The pipeline can still produce audio bytes.
    Active,
    /// End of stream reached; the buffer holds the complete file and the
    /// codec adapters have been released.
    Finished,
}

/// One FLAC-to-MP3 transcode, addressable by byte range.
pub struct TranscodeSession {
    decoder: Option<Box<dyn DecodeAdapter>>,
    encoder: Option<Box<dyn EncodeAdapter>>,
    channels: u16,
    buffer: OutputBuffer,
    trailer: [u8; LEGACY_TAG_LEN],
    total_size: u64,
    state: SessionState,
    source_info: String,
}

impl TranscodeSession {
    /// Open a session for the given virtual path.
    ///
    /// A `.mp3` path is mapped back to its `.flac` source; any other
    /// extension is opened as-is. The replay-gain scale is derived from
    /// the source tags before the encoder is configured.
    pub fn open(path: &Path, config: &TranscodeConfig) -> Result<Self> {
        let source = source_path_for(path);
        let decoder = FlacDecodeAdapter::open(&source)?;
        let scale = TagMapper::replay_gain_scale(decoder.tags());
        let encoder = LameEncodeAdapter::configure(decoder.properties(), config, scale)?;
        Self::from_parts(
            Box::new(decoder),
            Box::new(encoder),
            config,
            source.display().to_string(),
        )
    }

    /// Assemble a session from already-constructed codec adapters.
    ///
    /// Renders both tag representations, seeds the output buffer with the
    /// ID3v2 header, and fixes the total size for the session's lifetime.
    /// `source` is a human-readable description of the input, carried
    /// into diagnostics.
    pub fn from_parts(
        decoder: Box<dyn DecodeAdapter>,
        encoder: Box<dyn EncodeAdapter>,
        config: &TranscodeConfig,
        source: impl Into<String>,
    ) -> Result<Self> {
        config.validate()?;

        let properties = decoder.properties().clone();
        let tag = TagMapper::map(decoder.tags(), properties.duration_ms());
        let header = render_frames(&tag)?;
        let trailer = render_legacy(decoder.tags());

        let estimated_audio = estimate_audio_len(
            properties.total_samples,
            config.bitrate_kbps,
            properties.sample_rate,
        );
        let total_size = header.len() as u64 + estimated_audio + LEGACY_TAG_LEN as u64;

        let mut buffer = OutputBuffer::with_capacity(total_size as usize);
        buffer.append(&header)?;

        let source_info = source.into();
        info!(
            source = %source_info,
            header_len = header.len(),
            estimated_audio,
            total_size,
            "Opened transcode session"
        );

        Ok(Self {
            decoder: Some(decoder),
            encoder: Some(encoder),
            channels: properties.channels,
            buffer,
            trailer,
            total_size,
            state: SessionState::Active,
            source_info,
        })
    }

    /// Total size of the virtual file in bytes. Stable from construction.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Bytes produced so far, from offset zero.
    pub fn produced(&self) -> u64 {
        self.buffer.produced() as u64
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Read up to `length` bytes starting at `offset`.
    ///
    /// Ranges past the end of file are clamped; a read entirely past the
    /// end returns an empty vector. Reads inside the already-produced
    /// span never touch the codec pipeline. A read that lands in the
    /// final 128 bytes while earlier audio is still unproduced is served
    /// from the cached trailer with zero fill, without advancing the
    /// pipeline.
    pub fn read(&mut self, offset: u64, length: usize) -> Result<Vec<u8>> {
        if offset >= self.total_size || length == 0 {
            return Ok(Vec::new());
        }
        let length = length.min((self.total_size - offset) as usize);
        let end = offset + length as u64;

        // Tail probe: the trailer is known from construction, so a read
        // beyond the produced span that reaches into the last 128 bytes
        // can be answered without encoding anything.
        let trailer_start = self.total_size - LEGACY_TAG_LEN as u64;
        if self.state == SessionState::Active && offset > self.produced() && end > trailer_start {
            debug!(offset, length, "Serving tail probe from cached trailer");
            return Ok(self.tail_bytes(offset, length, trailer_start));
        }

        while self.state == SessionState::Active && self.produced() < end {
            self.fill_one_block()?;
        }

        let produced = self.produced();
        if offset >= produced {
            return Ok(Vec::new());
        }
        let available = (end.min(produced) - offset) as usize;
        Ok(self.buffer.read_at(offset as usize, available).to_vec())
    }

    /// Assemble a tail-probe response: zeros up to the trailer region,
    /// then the cached trailer bytes.
    fn tail_bytes(&self, offset: u64, length: usize, trailer_start: u64) -> Vec<u8> {
        let mut out = vec![0u8; length];
        for (i, byte) in out.iter_mut().enumerate() {
            let position = offset + i as u64;
            if position >= trailer_start {
                *byte = self.trailer[(position - trailer_start) as usize];
            }
        }
        out
    }

    /// Decode one block and append its encoded bytes, or finalize at end
    /// of stream.
    fn fill_one_block(&mut self) -> Result<()> {
        let decoder = match self.decoder.as_mut() {
            Some(decoder) => decoder,
            None => return Ok(()),
        };

        match decoder.next_block()? {
            Some(samples) => {
                let encoder = match self.encoder.as_mut() {
                    Some(encoder) => encoder,
                    None => return Ok(()),
                };
                let frames = samples.len() / self.channels as usize;
                let worst = encoder.worst_case_len(frames);
                let region = self.buffer.ensure_capacity(worst)?;
                let written = encoder.encode_into(&samples, region)?;
                self.buffer.commit(written);
                Ok(())
            }
            None => self.finalize(),
        }
    }

    /// Flush the encoder, clamp the produced span to the advertised audio
    /// length, append the trailer, and release the codec adapters.
    fn finalize(&mut self) -> Result<()> {
        if let Some(encoder) = self.encoder.as_mut() {
            let worst = encoder.worst_case_len(0);
            let region = self.buffer.ensure_capacity(worst)?;
            let written = encoder.flush_into(region)?;
            self.buffer.commit(written);
        }

        let audio_end = self.total_size - LEGACY_TAG_LEN as u64;
        let produced = self.produced();
        if produced != audio_end {
            let drift = produced as i64 - audio_end as i64;
            warn!(
                source = %self.source_info,
                drift,
                produced,
                advertised = audio_end,
                "Encoded size differs from estimate, clamping"
            );
        }
        self.buffer.clamp_produced(audio_end as usize)?;
        self.buffer.append(&self.trailer)?;

        self.decoder = None;
        self.encoder = None;
        self.state = SessionState::Finished;

        info!(total_size = self.total_size, "Transcode finished");
        Ok(())
    }
}

/// Resolve the source path for a virtual file name.
fn source_path_for(path: &Path) -> PathBuf {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("mp3") => path.with_extension("flac"),
        _ => path.to_path_buf(),
    }
}

/// Estimated length in bytes of the CBR audio span.
///
/// Two extra frames cover the encoder's lead-in and flush output. The
/// frame length is `144 * bitrate / sample_rate` bytes; multiplying out
/// in the numerator keeps the division safe for any nonzero rate.
fn estimate_audio_len(total_samples: u64, bitrate_kbps: u32, sample_rate: u32) -> u64 {
    let frame_count = divide_round(total_samples, SAMPLES_PER_FRAME) + 2;
    divide_round(
        frame_count * 144 * bitrate_kbps as u64 * 1000,
        sample_rate as u64,
    )
}

/// Integer division rounded to nearest.
fn divide_round(numerator: u64, denominator: u64) -> u64 {
    (numerator + denominator / 2) / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divide_round_rounds_to_nearest() {
        assert_eq!(divide_round(10, 3), 3);
        assert_eq!(divide_round(11, 3), 4);
        assert_eq!(divide_round(0, 5), 0);
    }

    #[test]
    fn audio_estimate_uses_frame_count_plus_lead_in() {
        // 1152 samples at 1 kHz is exactly one frame, plus two extra.
        // 3 frames * 144 * 128 kbps * 1000 / 1000 Hz = 55296 bytes.
        assert_eq!(estimate_audio_len(1152, 128, 1000), 55296);
    }

    #[test]
    fn empty_stream_still_has_lead_in_frames() {
        assert!(estimate_audio_len(0, 128, 44100) > 0);
    }

    #[test]
    fn sub_hundred_hertz_rates_do_not_fault() {
        // 3 frames * 144 * 128 kbps * 1000 / 50 Hz.
        assert_eq!(estimate_audio_len(1152, 128, 50), 1_105_920);
        assert!(estimate_audio_len(0, 32, 1) > 0);
    }

    #[test]
    fn virtual_path_maps_back_to_flac() {
        assert_eq!(
            source_path_for(Path::new("/music/song.mp3")),
            PathBuf::from("/music/song.flac")
        );
        assert_eq!(
            source_path_for(Path::new("/music/song.MP3")),
            PathBuf::from("/music/song.flac")
        );
        assert_eq!(
            source_path_for(Path::new("/music/song.flac")),
            PathBuf::from("/music/song.flac")
        );
    }
}
