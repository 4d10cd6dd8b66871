//! # Tag Rendering
//!
//! Turns the mapped frame set into its two byte forms: the variable
//! length ID3v2 header tag, and the fixed 128-byte ID3v1.1 trailer that
//! legacy tools probe at the end of a file.

use crate::error::Result;
use crate::types::SourceTags;
use id3::{Tag, Version};

/// Length of the fixed trailer tag.
pub const LEGACY_TAG_LEN: usize = 128;

/// Render the frame set as ID3v2.4 bytes.
///
/// The returned vector's length is the exact header tag size used for
/// the virtual file's size computation.
pub fn render_frames(tag: &Tag) -> Result<Vec<u8>> {
    let mut rendered = Vec::new();
    tag.write_to(&mut rendered, Version::Id3v24)?;
    Ok(rendered)
}

/// Render the fixed-width ID3v1.1 trailer from the source tag values.
///
/// Layout: `"TAG"` + title[30] + artist[30] + album[30] + year[4] +
/// comment[28] + `\0` + track + genre, each text field zero-padded.
/// When no track number parses, the comment field spans the full 30
/// bytes (plain ID3v1).
pub fn render_legacy(tags: &SourceTags) -> [u8; LEGACY_TAG_LEN] {
    let mut out = [0u8; LEGACY_TAG_LEN];
    out[0..3].copy_from_slice(b"TAG");

    write_field(&mut out[3..33], tags.get("TITLE"));
    write_field(&mut out[33..63], tags.get("ARTIST"));
    write_field(&mut out[63..93], tags.get("ALBUM"));
    // A full date collapses to its leading four digits.
    write_field(&mut out[93..97], tags.get("DATE"));

    let track = tags.get("TRACKNUMBER").and_then(|t| t.parse::<u8>().ok());
    match track {
        Some(track) => {
            write_field(&mut out[97..125], tags.get("DESCRIPTION"));
            out[125] = 0;
            out[126] = track;
        }
        None => write_field(&mut out[97..127], tags.get("DESCRIPTION")),
    }

    out[127] = genre_index(tags.get("GENRE"));
    out
}

/// Copy a value into a zero-padded fixed-width field, truncating as needed.
fn write_field(field: &mut [u8], value: Option<&str>) {
    if let Some(value) = value {
        let bytes = value.as_bytes();
        let len = bytes.len().min(field.len());
        field[..len].copy_from_slice(&bytes[..len]);
    }
}

/// ID3v1 genre names, indexed by genre byte: the 80 standard entries
/// followed by the common Winamp extensions.
const GENRE_NAMES: &[&str] = &[
    "Blues",
    "Classic Rock",
    "Country",
    "Dance",
    "Disco",
    "Funk",
    "Grunge",
    "Hip-Hop",
    "Jazz",
    "Metal",
    "New Age",
    "Oldies",
    "Other",
    "Pop",
    "R&B",
    "Rap",
    "Reggae",
    "Rock",
    "Techno",
    "Industrial",
    "Alternative",
    "Ska",
    "Death Metal",
    "Pranks",
    "Soundtrack",
    "Euro-Techno",
    "Ambient",
    "Trip-Hop",
    "Vocal",
    "Jazz+Funk",
    "Fusion",
    "Trance",
    "Classical",
    "Instrumental",
    "Acid",
    "House",
    "Game",
    "Sound Clip",
    "Gospel",
    "Noise",
    "AlternRock",
    "Bass",
    "Soul",
    "Punk",
    "Space",
    "Meditative",
    "Instrumental Pop",
    "Instrumental Rock",
    "Ethnic",
    "Gothic",
    "Darkwave",
    "Techno-Industrial",
    "Electronic",
    "Pop-Folk",
    "Eurodance",
    "Dream",
    "Southern Rock",
    "Comedy",
    "Cult",
    "Gangsta",
    "Top 40",
    "Christian Rap",
    "Pop/Funk",
    "Jungle",
    "Native American",
    "Cabaret",
    "New Wave",
    "Psychadelic",
    "Rave",
    "Showtunes",
    "Trailer",
    "Lo-Fi",
    "Tribal",
    "Acid Punk",
    "Acid Jazz",
    "Polka",
    "Retro",
    "Musical",
    "Rock & Roll",
    "Hard Rock",
    "Folk",
    "Folk-Rock",
    "National Folk",
    "Swing",
    "Fast Fusion",
    "Bebob",
    "Latin",
    "Revival",
    "Celtic",
    "Bluegrass",
    "Avantgarde",
    "Gothic Rock",
    "Progressive Rock",
    "Psychedelic Rock",
    "Symphonic Rock",
    "Slow Rock",
    "Big Band",
    "Chorus",
    "Easy Listening",
    "Acoustic",
    "Humour",
    "Speech",
    "Chanson",
    "Opera",
    "Chamber Music",
    "Sonata",
    "Symphony",
    "Booty Bass",
    "Primus",
    "Porn Groove",
    "Satire",
    "Slow Jam",
    "Club",
    "Tango",
    "Samba",
    "Folklore",
    "Ballad",
    "Power Ballad",
    "Rhythmic Soul",
    "Freestyle",
    "Duet",
    "Punk Rock",
    "Drum Solo",
    "A capella",
    "Euro-House",
    "Dance Hall",
];

/// Look up the ID3v1 genre index for a genre name; 0xFF means "none".
fn genre_index(genre: Option<&str>) -> u8 {
    let Some(genre) = genre else {
        return 0xFF;
    };
    GENRE_NAMES
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(genre))
        .map(|index| index as u8)
        .unwrap_or(0xFF)
}
