//! # Tag Mapping & Rendering
//!
//! Translates source-format metadata (Vorbis comments plus an optional
//! embedded picture) into the target-format tag forms:
//!
//! - A set of ID3v2 frames rendered as the variable-length header tag
//! - A fixed 128-byte ID3v1.1 trailer tag
//! - A replay-gain derived linear scale hint for the encoder
//!
//! The mapper consumes a [`SourceTags`] dictionary and produces an
//! [`id3::Tag`]; rendering turns that tag set into bytes and discards it.

pub mod error;
pub mod mapper;
pub mod render;
pub mod types;

pub use error::{Result, TagError};
pub use mapper::TagMapper;
pub use render::{render_frames, render_legacy, LEGACY_TAG_LEN};
pub use types::{PictureBlock, SourceTags};
