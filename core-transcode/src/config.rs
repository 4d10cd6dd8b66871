//! # Transcode Configuration
//!
//! Process-wide encoding parameters, passed explicitly into session
//! construction and read-only afterwards.

use crate::error::{Result, TranscodeError};
use serde::{Deserialize, Serialize};

/// Encoder configuration shared by all sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeConfig {
    /// Target constant bitrate in kbps.
    ///
    /// Default: 128.
    #[serde(default = "default_bitrate_kbps")]
    pub bitrate_kbps: u32,

    /// LAME quality level, 0 (best, slowest) to 9 (worst, fastest).
    ///
    /// Default: 5.
    #[serde(default = "default_quality")]
    pub quality: u8,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            bitrate_kbps: default_bitrate_kbps(),
            quality: default_quality(),
        }
    }
}

impl TranscodeConfig {
    /// Configuration favoring output quality over encoding speed.
    pub fn high_quality() -> Self {
        Self {
            bitrate_kbps: 320,
            quality: 2,
        }
    }

    /// Configuration favoring encoding speed and small output.
    pub fn fast() -> Self {
        Self {
            bitrate_kbps: 96,
            quality: 7,
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !(32..=320).contains(&self.bitrate_kbps) {
            return Err(TranscodeError::InvalidConfig(format!(
                "bitrate_kbps must be between 32 and 320, got {}",
                self.bitrate_kbps
            )));
        }
        if self.quality > 9 {
            return Err(TranscodeError::InvalidConfig(format!(
                "quality must be between 0 and 9, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

fn default_bitrate_kbps() -> u32 {
    128
}

fn default_quality() -> u8 {
    5
}
