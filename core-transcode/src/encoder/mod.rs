//! # Encode Adapter
//!
//! MP3 encoding via LAME, behind the [`crate::traits::EncodeAdapter`]
//! seam. The adapter owns the f32→i16 conversion buffer (sized once,
//! reused per block) and applies the replay-gain scale during that
//! conversion.

mod lame;

pub use lame::LameEncodeAdapter;
