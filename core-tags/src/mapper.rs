//! # Metadata Mapper
//!
//! Maps the source tag dictionary (Vorbis comment spellings) onto ID3v2
//! frames, and derives the replay-gain scale hint for the encoder.
//!
//! A key absent in the source yields no frame; empty frames are never
//! emitted. All text passes through as UTF-8 so players render non-ASCII
//! metadata correctly.

use crate::types::{PictureBlock, SourceTags};
use id3::frame::{Comment, Content, ExtendedLink, Picture, PictureType};
use id3::{Frame, Tag, TagLike};
use tracing::debug;

/// Software name written into the TSSE (encoding settings) frame.
const ENCODER_NAME: &str = "virtual-transcode";

/// Well-known source keys and the text frame each maps to.
const TEXT_FRAME_MAP: &[(&str, &str)] = &[
    ("TITLE", "TIT2"),
    ("ARTIST", "TPE1"),
    ("ALBUM", "TALB"),
    ("GENRE", "TCON"),
    ("DATE", "TDRC"),
    ("COMPOSER", "TCOM"),
    ("PERFORMER", "TOPE"),
    ("COPYRIGHT", "TCOP"),
    ("ENCODED_BY", "TENC"),
    ("ORGANIZATION", "TPUB"),
    ("CONDUCTOR", "TPE3"),
];

/// Builds the target-format frame set from source metadata.
///
/// The returned [`id3::Tag`] is a transient value: callers render it to
/// bytes (header and trailer forms) and discard it.
pub struct TagMapper;

impl TagMapper {
    /// Map source tags and the known stream duration into an ID3v2 frame set.
    ///
    /// `duration_ms` is the audio duration in milliseconds; it is always
    /// emitted as a TLEN frame.
    pub fn map(tags: &SourceTags, duration_ms: u64) -> Tag {
        let mut id3 = Tag::new();

        id3.add_frame(Frame::text("TSSE", ENCODER_NAME));
        id3.add_frame(Frame::text("TLEN", duration_ms.to_string()));

        for (source_key, frame_id) in TEXT_FRAME_MAP {
            if let Some(value) = tags.get(source_key) {
                id3.add_frame(Frame::text(*frame_id, value));
            }
        }

        if let Some(comment) = tags.get("DESCRIPTION") {
            id3.add_frame(Frame::with_content(
                "COMM",
                Content::Comment(Comment {
                    lang: "eng".to_string(),
                    description: String::new(),
                    text: comment.to_string(),
                }),
            ));
        }

        if let Some(license) = tags.get("LICENSE") {
            id3.add_frame(Frame::with_content(
                "WXXX",
                Content::ExtendedLink(ExtendedLink {
                    description: String::new(),
                    link: license.to_string(),
                }),
            ));
        }

        // Album artist can be stored under two different spellings.
        if let Some(album_artist) = tags.get("ALBUMARTIST").or_else(|| tags.get("ALBUM ARTIST")) {
            id3.add_frame(Frame::text("TPE2", album_artist));
        }

        if let Some(track) = Self::numbering(tags, "TRACKNUMBER", "TRACKTOTAL") {
            id3.add_frame(Frame::text("TRCK", track));
        }
        if let Some(disc) = Self::numbering(tags, "DISCNUMBER", "DISCTOTAL") {
            id3.add_frame(Frame::text("TPOS", disc));
        }

        if let Some(picture) = tags.picture() {
            id3.add_frame(Self::picture_frame(picture));
        }

        debug!("Mapped {} source keys into ID3v2 frames", tags.len());
        id3
    }

    /// Derive the linear playback scale factor from replay-gain tags.
    ///
    /// The album-level gain takes precedence over the track-level gain;
    /// a present but zero (or unparseable) value yields no scaling. The
    /// decibel value maps to a linear factor as `10^(dB/20)`.
    pub fn replay_gain_scale(tags: &SourceTags) -> Option<f32> {
        let gain = tags
            .get("REPLAYGAIN_ALBUM_GAIN")
            .or_else(|| tags.get("REPLAYGAIN_TRACK_GAIN"))?;
        let db = Self::parse_db(gain);
        if db == 0.0 {
            return None;
        }
        Some(10f32.powf(db / 20.0))
    }

    /// Parse the leading decibel number of a replay-gain value like
    /// `"-6.20 dB"`. Unparseable input counts as zero gain.
    fn parse_db(value: &str) -> f32 {
        value
            .split_whitespace()
            .next()
            .and_then(|token| token.parse::<f32>().ok())
            .unwrap_or(0.0)
    }

    /// Format `"<number>"` or `"<number>/<total>"`; both copied verbatim.
    fn numbering(tags: &SourceTags, number_key: &str, total_key: &str) -> Option<String> {
        let number = tags.get(number_key)?;
        Some(match tags.get(total_key) {
            Some(total) => format!("{}/{}", number, total),
            None => number.to_string(),
        })
    }

    fn picture_frame(picture: &PictureBlock) -> Frame {
        Frame::with_content(
            "APIC",
            Content::Picture(Picture {
                mime_type: picture.media_type.clone(),
                picture_type: picture_type_from_code(picture.picture_type),
                description: picture.description.clone(),
                data: picture.data.to_vec(),
            }),
        )
    }
}

/// Translate the numeric picture-type code into the frame enum, keeping
/// unknown codes as-is.
fn picture_type_from_code(code: u8) -> PictureType {
    match code {
        0 => PictureType::Other,
        1 => PictureType::Icon,
        2 => PictureType::OtherIcon,
        3 => PictureType::CoverFront,
        4 => PictureType::CoverBack,
        5 => PictureType::Leaflet,
        6 => PictureType::Media,
        7 => PictureType::LeadArtist,
        8 => PictureType::Artist,
        9 => PictureType::Conductor,
        10 => PictureType::Band,
        11 => PictureType::Composer,
        12 => PictureType::Lyricist,
        13 => PictureType::RecordingLocation,
        14 => PictureType::DuringRecording,
        15 => PictureType::DuringPerformance,
        16 => PictureType::ScreenCapture,
        17 => PictureType::BrightFish,
        18 => PictureType::Illustration,
        19 => PictureType::BandLogo,
        20 => PictureType::PublisherLogo,
        other => PictureType::Undefined(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> SourceTags {
        let mut tags = SourceTags::new();
        for (k, v) in pairs {
            tags.insert(k, *v);
        }
        tags
    }

    #[test]
    fn absent_keys_yield_no_frames() {
        let id3 = TagMapper::map(&SourceTags::new(), 1000);
        assert!(id3.get("TIT2").is_none());
        assert!(id3.get("TRCK").is_none());
        // TSSE and TLEN are always present.
        assert!(id3.get("TSSE").is_some());
        assert_eq!(
            id3.get("TLEN").and_then(|f| f.content().text()),
            Some("1000")
        );
    }

    #[test]
    fn track_with_total() {
        let id3 = TagMapper::map(&tags(&[("TRACKNUMBER", "3"), ("TRACKTOTAL", "12")]), 0);
        assert_eq!(id3.get("TRCK").and_then(|f| f.content().text()), Some("3/12"));
    }

    #[test]
    fn track_without_total() {
        let id3 = TagMapper::map(&tags(&[("TRACKNUMBER", "3")]), 0);
        assert_eq!(id3.get("TRCK").and_then(|f| f.content().text()), Some("3"));
    }

    #[test]
    fn album_artist_fallback_spelling() {
        let id3 = TagMapper::map(&tags(&[("ALBUM ARTIST", "Various")]), 0);
        assert_eq!(
            id3.get("TPE2").and_then(|f| f.content().text()),
            Some("Various")
        );

        let both = TagMapper::map(
            &tags(&[("ALBUMARTIST", "Primary"), ("ALBUM ARTIST", "Secondary")]),
            0,
        );
        assert_eq!(
            both.get("TPE2").and_then(|f| f.content().text()),
            Some("Primary")
        );
    }

    #[test]
    fn album_gain_takes_precedence() {
        let tags = tags(&[
            ("REPLAYGAIN_ALBUM_GAIN", "-6.0 dB"),
            ("REPLAYGAIN_TRACK_GAIN", "+3.0 dB"),
        ]);
        let scale = TagMapper::replay_gain_scale(&tags).unwrap();
        assert!((scale - 10f32.powf(-6.0 / 20.0)).abs() < 1e-6);
    }

    #[test]
    fn zero_gain_yields_no_scale() {
        assert!(TagMapper::replay_gain_scale(&tags(&[("REPLAYGAIN_ALBUM_GAIN", "0.0 dB")])).is_none());
        assert!(TagMapper::replay_gain_scale(&tags(&[("REPLAYGAIN_TRACK_GAIN", "garbage")])).is_none());
        assert!(TagMapper::replay_gain_scale(&SourceTags::new()).is_none());
    }

    #[test]
    fn non_ascii_text_passes_through() {
        let id3 = TagMapper::map(&tags(&[("TITLE", "café みどり")]), 0);
        assert_eq!(
            id3.get("TIT2").and_then(|f| f.content().text()),
            Some("café みどり")
        );
    }
}
