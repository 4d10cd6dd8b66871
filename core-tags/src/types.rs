//! # Source Metadata Types
//!
//! The tag dictionary handed over by the decode adapter: text comment
//! pairs plus at most one embedded picture block.

use bytes::Bytes;
use std::collections::BTreeMap;

/// An embedded picture block carried verbatim from the source file.
///
/// The raw image bytes, MIME type and picture-type code pass through to
/// the target tag unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureBlock {
    /// MIME type of the image data (e.g. `image/jpeg`).
    pub media_type: String,
    /// Picture-type code as defined by the tag format (3 = front cover).
    pub picture_type: u8,
    /// Free-text description, possibly empty.
    pub description: String,
    /// Raw image bytes, unmodified.
    pub data: Bytes,
}

/// Source tag dictionary: comment key/value pairs plus an optional picture.
///
/// Keys are stored uppercased so lookups match the well-known Vorbis
/// comment spellings (`TITLE`, `TRACKNUMBER`, ...) regardless of how the
/// source file cased them. All values are UTF-8 text.
#[derive(Debug, Clone, Default)]
pub struct SourceTags {
    entries: BTreeMap<String, String>,
    picture: Option<PictureBlock>,
}

impl SourceTags {
    /// Create an empty tag dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a text comment pair. The key is uppercased.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_uppercase(), value.into());
    }

    /// Look up a comment value by (case-insensitive) key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&key.to_uppercase()).map(String::as_str)
    }

    /// Attach the embedded picture block. At most one is kept; the first
    /// one wins, matching the single-picture-frame contract.
    pub fn set_picture(&mut self, picture: PictureBlock) {
        if self.picture.is_none() {
            self.picture = Some(picture);
        }
    }

    /// The embedded picture block, if the source carried one.
    pub fn picture(&self) -> Option<&PictureBlock> {
        self.picture.as_ref()
    }

    /// Number of text comment pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no comment pairs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
