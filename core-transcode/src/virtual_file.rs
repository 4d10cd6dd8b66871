//! # Virtual File Handle
//!
//! Thread-safe wrapper around a [`TranscodeSession`]. The session is the
//! unit of concurrency: every read holds the session lock for its full
//! duration, so pipeline advancement, the end-of-stream clamp, and the
//! copy-out are atomic with respect to other readers. The total size is
//! cached outside the lock because stat-style queries dominate and never
//! need the pipeline.

use crate::config::TranscodeConfig;
use crate::error::Result;
use crate::session::{SessionState, TranscodeSession};
use parking_lot::Mutex;
use std::path::Path;

/// A byte-addressable view of one transcoded file.
pub struct VirtualFile {
    session: Mutex<TranscodeSession>,
    size: u64,
}

impl VirtualFile {
    /// Open a virtual file for the given path.
    ///
    /// All construction work happens here; once this returns, `size` is
    /// final and reads cannot fail for construction reasons.
    pub fn open(path: &Path, config: &TranscodeConfig) -> Result<Self> {
        let session = TranscodeSession::open(path, config)?;
        Ok(Self::from_session(session))
    }

    /// Wrap an already-constructed session.
    pub fn from_session(session: TranscodeSession) -> Self {
        let size = session.total_size();
        Self {
            session: Mutex::new(session),
            size,
        }
    }

    /// Total file size in bytes. Never locks.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Read up to `length` bytes at `offset`, advancing the transcode as
    /// far as the range requires.
    pub fn read_at(&self, offset: u64, length: usize) -> Result<Vec<u8>> {
        self.session.lock().read(offset, length)
    }

    /// Whether the underlying transcode has run to completion.
    pub fn is_finished(&self) -> bool {
        self.session.lock().state() == SessionState::Finished
    }
}
