//! # FLAC Decode Adapter
//!
//! Wraps Symphonia's probe/format/decoder pipeline behind the
//! [`DecodeAdapter`] seam. Stream properties and the source tag
//! dictionary are captured while opening, before any sample block is
//! returned, so the session can size the virtual file and configure the
//! encoder up front.

use crate::decoder::sample_converter::SampleConverter;
use crate::error::{Result, TranscodeError};
use crate::traits::{DecodeAdapter, StreamProperties};
use core_tags::{PictureBlock, SourceTags};
use std::path::Path;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::{MetadataOptions, MetadataRevision, StandardTagKey, StandardVisualKey, Visual};
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Consecutive malformed units tolerated before the stream is declared
/// corrupted. Individual bad units are skipped with a warning.
const MAX_CONSECUTIVE_ERRORS: usize = 10;

/// Pull-style FLAC decoder.
pub struct FlacDecodeAdapter {
    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    properties: StreamProperties,
    tags: SourceTags,
    converter: SampleConverter,
    eof: bool,
    source_info: String,
}

impl FlacDecodeAdapter {
    /// Open a FLAC file and capture its stream properties and tags.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the file cannot be opened, the
    /// container cannot be probed, no audio track is present, the sample
    /// rate is zero, or the channel layout is not mono/stereo.
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            TranscodeError::SourceOpen(format!("{}: {}", path.display(), e))
        })?;

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let media_source = Box::new(file) as Box<dyn MediaSource>;
        let mss = MediaSourceStream::new(media_source, Default::default());

        let mut probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                TranscodeError::SourceOpen(format!("failed to probe {}: {}", path.display(), e))
            })?;

        let mut format_reader = probed.format;

        // Collect the tag dictionary from every metadata revision seen
        // during probing; for FLAC this covers the Vorbis comment and
        // picture blocks, which all precede the first audio frame.
        let mut tags = SourceTags::new();
        if let Some(metadata) = probed.metadata.get() {
            if let Some(revision) = metadata.current() {
                collect_metadata(revision, &mut tags);
            }
        }
        if let Some(revision) = format_reader.metadata().current() {
            collect_metadata(revision, &mut tags);
        }

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| {
                TranscodeError::InvalidStream("no decodable audio track".to_string())
            })?;
        let track_id = track.id;

        let sample_rate = track
            .codec_params
            .sample_rate
            .filter(|rate| *rate > 0)
            .ok_or_else(|| {
                TranscodeError::InvalidStream("stream has no usable sample rate".to_string())
            })?;

        let channels = track
            .codec_params
            .channels
            .map(|channels| channels.count() as u16)
            .ok_or_else(|| {
                TranscodeError::InvalidStream("stream declares no channel layout".to_string())
            })?;
        if channels == 0 || channels > 2 {
            return Err(TranscodeError::UnsupportedLayout(channels));
        }

        let properties = StreamProperties {
            sample_rate,
            channels,
            total_samples: track.codec_params.n_frames.unwrap_or(0),
            bits_per_sample: track.codec_params.bits_per_sample,
        };

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| {
                TranscodeError::InvalidStream(format!("failed to create decoder: {}", e))
            })?;

        debug!(
            source = %path.display(),
            sample_rate,
            channels,
            total_samples = properties.total_samples,
            "Opened FLAC source"
        );

        Ok(Self {
            format_reader,
            decoder,
            track_id,
            properties,
            tags,
            converter: SampleConverter::new(),
            eof: false,
            source_info: path.display().to_string(),
        })
    }
}

impl DecodeAdapter for FlacDecodeAdapter {
    fn properties(&self) -> &StreamProperties {
        &self.properties
    }

    fn tags(&self) -> &SourceTags {
        &self.tags
    }

    fn next_block(&mut self) -> Result<Option<Vec<f32>>> {
        if self.eof {
            return Ok(None);
        }

        let mut consecutive_errors = 0;

        loop {
            let packet = match self.format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    debug!(source = %self.source_info, "Reached end of stream");
                    self.eof = true;
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    return Err(TranscodeError::Decoder(
                        "track list changed, reset required".to_string(),
                    ));
                }
                Err(SymphoniaError::IoError(e)) => {
                    consecutive_errors += 1;
                    warn!(
                        "I/O error reading unit (attempt {}/{}): {}",
                        consecutive_errors, MAX_CONSECUTIVE_ERRORS, e
                    );
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        return Err(TranscodeError::CorruptedStream(format!(
                            "stream I/O failure after {} attempts: {}",
                            MAX_CONSECUTIVE_ERRORS, e
                        )));
                    }
                    continue;
                }
                Err(e) => {
                    return Err(TranscodeError::Decoder(format!(
                        "failed to read unit: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    return Ok(Some(self.converter.to_interleaved_f32(decoded).to_vec()));
                }
                // Malformed units are non-fatal; skip and keep going.
                Err(SymphoniaError::DecodeError(e)) => {
                    consecutive_errors += 1;
                    warn!(
                        "Skipping malformed unit (attempt {}/{}): {}",
                        consecutive_errors, MAX_CONSECUTIVE_ERRORS, e
                    );
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        return Err(TranscodeError::CorruptedStream(format!(
                            "stream corruption after {} failed units",
                            MAX_CONSECUTIVE_ERRORS
                        )));
                    }
                    continue;
                }
                Err(SymphoniaError::IoError(e)) => {
                    consecutive_errors += 1;
                    warn!(
                        "Skipping unit with I/O error (attempt {}/{}): {}",
                        consecutive_errors, MAX_CONSECUTIVE_ERRORS, e
                    );
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        return Err(TranscodeError::CorruptedStream(format!(
                            "stream corruption after {} failed units",
                            MAX_CONSECUTIVE_ERRORS
                        )));
                    }
                    continue;
                }
                Err(e) => {
                    return Err(TranscodeError::Decoder(format!(
                        "failed to decode unit: {}",
                        e
                    )));
                }
            }
        }
    }
}

/// Copy one metadata revision's tags and first picture into `tags`.
fn collect_metadata(revision: &MetadataRevision, tags: &mut SourceTags) {
    for tag in revision.tags() {
        tags.insert(&tag.key, tag.value.to_string());
    }
    if let Some(visual) = revision.visuals().first() {
        tags.set_picture(picture_from_visual(visual));
    }
}

fn picture_from_visual(visual: &Visual) -> PictureBlock {
    let description = visual
        .tags
        .iter()
        .find(|tag| matches!(tag.std_key, Some(StandardTagKey::Description)))
        .map(|tag| tag.value.to_string())
        .unwrap_or_default();

    PictureBlock {
        media_type: visual.media_type.clone(),
        picture_type: visual_key_code(visual.usage),
        description,
        data: visual.data.to_vec().into(),
    }
}

/// Map the visual usage back to the numeric picture-type code the target
/// tag format uses. Unknown or absent usage maps to "other" (0).
fn visual_key_code(usage: Option<StandardVisualKey>) -> u8 {
    match usage {
        Some(StandardVisualKey::FileIcon) => 1,
        Some(StandardVisualKey::OtherIcon) => 2,
        Some(StandardVisualKey::FrontCover) => 3,
        Some(StandardVisualKey::BackCover) => 4,
        Some(StandardVisualKey::Leaflet) => 5,
        Some(StandardVisualKey::Media) => 6,
        Some(StandardVisualKey::LeadArtistPerformerSoloist) => 7,
        Some(StandardVisualKey::ArtistPerformer) => 8,
        Some(StandardVisualKey::Conductor) => 9,
        Some(StandardVisualKey::BandOrchestra) => 10,
        Some(StandardVisualKey::Composer) => 11,
        Some(StandardVisualKey::Lyricist) => 12,
        Some(StandardVisualKey::RecordingLocation) => 13,
        Some(StandardVisualKey::RecordingSession) => 14,
        Some(StandardVisualKey::Performance) => 15,
        Some(StandardVisualKey::ScreenCapture) => 16,
        Some(StandardVisualKey::Illustration) => 18,
        Some(StandardVisualKey::BandArtistLogo) => 19,
        Some(StandardVisualKey::PublisherStudioLogo) => 20,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_file_is_source_error() {
        let err = FlacDecodeAdapter::open(Path::new("/nonexistent/audio.flac"))
            .err()
            .expect("open should fail");
        assert!(matches!(err, TranscodeError::SourceOpen(_)));
        assert!(err.is_construction_error());
    }

    #[test]
    fn front_cover_maps_to_code_three() {
        assert_eq!(visual_key_code(Some(StandardVisualKey::FrontCover)), 3);
        assert_eq!(visual_key_code(None), 0);
    }
}
