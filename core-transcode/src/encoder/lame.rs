//! # LAME Encode Adapter
//!
//! Thin wrapper around `mp3lame-encoder`. Encoded bytes are written into
//! caller-provided `MaybeUninit` spare capacity so the session's output
//! buffer receives them without an intermediate copy.

use crate::config::TranscodeConfig;
use crate::error::{Result, TranscodeError};
use crate::traits::{EncodeAdapter, StreamProperties};
use mp3lame_encoder::{Builder, Encoder, FlushNoGap, InterleavedPcm, MonoPcm};
use std::mem::MaybeUninit;
use tracing::debug;

/// Flush headroom in bytes; LAME's worst-case guidance for one block is
/// `1.25 * samples + 7200`.
const WORST_CASE_SLACK: usize = 7200;

/// CBR MP3 encoder with a reused sample-conversion buffer.
pub struct LameEncodeAdapter {
    encoder: Encoder,
    channels: u16,
    scale: f32,
    pcm: Vec<i16>,
}

impl LameEncodeAdapter {
    /// Configure a LAME encoder for the given stream.
    ///
    /// `scale` is the optional replay-gain linear factor; it is applied
    /// to every sample during format conversion.
    ///
    /// # Errors
    ///
    /// Returns [`TranscodeError::EncoderInit`] if LAME rejects any
    /// parameter or the context cannot be allocated, and
    /// [`TranscodeError::UnsupportedLayout`] for more than two channels.
    pub fn configure(
        properties: &StreamProperties,
        config: &TranscodeConfig,
        scale: Option<f32>,
    ) -> Result<Self> {
        config.validate()?;
        if properties.channels == 0 || properties.channels > 2 {
            return Err(TranscodeError::UnsupportedLayout(properties.channels));
        }

        let mut builder = Builder::new().ok_or_else(|| {
            TranscodeError::EncoderInit("failed to allocate LAME context".to_string())
        })?;

        builder
            .set_num_channels(properties.channels as u8)
            .map_err(|e| TranscodeError::EncoderInit(format!("invalid channel count: {:?}", e)))?;
        builder
            .set_sample_rate(properties.sample_rate)
            .map_err(|e| TranscodeError::EncoderInit(format!("invalid sample rate: {:?}", e)))?;
        builder
            .set_brate(bitrate_setting(config.bitrate_kbps))
            .map_err(|e| TranscodeError::EncoderInit(format!("invalid bitrate: {:?}", e)))?;
        builder
            .set_quality(quality_setting(config.quality))
            .map_err(|e| TranscodeError::EncoderInit(format!("invalid quality: {:?}", e)))?;
        // The Xing/VBR info frame would throw off the CBR size estimate.
        builder
            .set_to_write_vbr_tag(false)
            .map_err(|e| TranscodeError::EncoderInit(format!("failed to disable VBR tag: {:?}", e)))?;

        let encoder = builder
            .build()
            .map_err(|e| TranscodeError::EncoderInit(format!("failed to build encoder: {:?}", e)))?;

        debug!(
            sample_rate = properties.sample_rate,
            channels = properties.channels,
            bitrate_kbps = config.bitrate_kbps,
            quality = config.quality,
            scale = scale.unwrap_or(1.0),
            "Configured LAME encoder"
        );

        Ok(Self {
            encoder,
            channels: properties.channels,
            scale: scale.unwrap_or(1.0),
            pcm: Vec::new(),
        })
    }

    /// Convert interleaved f32 samples to i16, applying the scale factor
    /// and clamping, into the reused conversion buffer.
    fn convert(&mut self, samples: &[f32]) {
        self.pcm.clear();
        self.pcm.reserve(samples.len());
        let scale = self.scale;
        self.pcm.extend(
            samples
                .iter()
                .map(|&sample| ((sample * scale).clamp(-1.0, 1.0) * 32767.0) as i16),
        );
    }
}

impl EncodeAdapter for LameEncodeAdapter {
    fn worst_case_len(&self, frames: usize) -> usize {
        frames * 5 / 4 + WORST_CASE_SLACK
    }

    fn encode_into(&mut self, samples: &[f32], out: &mut [MaybeUninit<u8>]) -> Result<usize> {
        self.convert(samples);
        let written = if self.channels == 1 {
            self.encoder.encode(MonoPcm(&self.pcm), out)
        } else {
            self.encoder.encode(InterleavedPcm(&self.pcm), out)
        }
        .map_err(|e| TranscodeError::Encode(format!("encode failed: {:?}", e)))?;
        Ok(written)
    }

    fn flush_into(&mut self, out: &mut [MaybeUninit<u8>]) -> Result<usize> {
        self.encoder
            .flush::<FlushNoGap>(out)
            .map_err(|e| TranscodeError::Encode(format!("flush failed: {:?}", e)))
    }
}

/// Select the nearest supported CBR bitrate at or above the request.
fn bitrate_setting(bitrate_kbps: u32) -> mp3lame_encoder::Bitrate {
    match bitrate_kbps {
        0..=32 => mp3lame_encoder::Bitrate::Kbps32,
        33..=40 => mp3lame_encoder::Bitrate::Kbps40,
        41..=48 => mp3lame_encoder::Bitrate::Kbps48,
        49..=64 => mp3lame_encoder::Bitrate::Kbps64,
        65..=80 => mp3lame_encoder::Bitrate::Kbps80,
        81..=96 => mp3lame_encoder::Bitrate::Kbps96,
        97..=112 => mp3lame_encoder::Bitrate::Kbps112,
        113..=128 => mp3lame_encoder::Bitrate::Kbps128,
        129..=160 => mp3lame_encoder::Bitrate::Kbps160,
        161..=192 => mp3lame_encoder::Bitrate::Kbps192,
        193..=224 => mp3lame_encoder::Bitrate::Kbps224,
        225..=256 => mp3lame_encoder::Bitrate::Kbps256,
        _ => mp3lame_encoder::Bitrate::Kbps320,
    }
}

/// Map the 0 (best) to 9 (worst) quality level onto the builder's enum.
fn quality_setting(quality: u8) -> mp3lame_encoder::Quality {
    match quality {
        0 => mp3lame_encoder::Quality::Best,
        1 => mp3lame_encoder::Quality::SecondBest,
        2 => mp3lame_encoder::Quality::NearBest,
        3 => mp3lame_encoder::Quality::VeryNice,
        4 => mp3lame_encoder::Quality::Nice,
        5 => mp3lame_encoder::Quality::Good,
        6 => mp3lame_encoder::Quality::Decent,
        7 => mp3lame_encoder::Quality::Ok,
        8 => mp3lame_encoder::Quality::SecondWorst,
        _ => mp3lame_encoder::Quality::Worst,
    }
}
