//! Session behavior tests driven by scripted codec adapters.
//!
//! The fakes produce deterministic byte streams so every property of the
//! session (stable size, cache hits, tail probes, the finalize clamp) can
//! be asserted without real audio.

use core_tags::{render_frames, SourceTags, TagMapper, LEGACY_TAG_LEN};
use core_transcode::{
    DecodeAdapter, EncodeAdapter, Result, SessionState, StreamProperties, TranscodeConfig,
    TranscodeError, TranscodeSession, VirtualFile,
};
use std::io::Write;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const CHANNELS: u16 = 2;
const FRAMES_PER_BLOCK: usize = 1152;
// Fewer bytes per block than the session's CBR estimate predicts, so the
// finalize clamp zero-extends, as a real encoder undershooting would.
const BYTES_PER_BLOCK: usize = 300;
const FLUSH_MARKER: u8 = 0xAB;
const FLUSH_LEN: usize = 96;

/// Yields a fixed number of identical sample blocks and counts pulls.
struct FakeDecoder {
    properties: StreamProperties,
    tags: SourceTags,
    blocks_remaining: usize,
    calls: Arc<AtomicUsize>,
}

impl FakeDecoder {
    fn new(blocks: usize, calls: Arc<AtomicUsize>) -> Self {
        Self::with_stream(blocks, CHANNELS, 44100, calls)
    }

    fn with_stream(blocks: usize, channels: u16, sample_rate: u32, calls: Arc<AtomicUsize>) -> Self {
        let mut tags = SourceTags::new();
        tags.insert("TITLE", "Scripted Stream");
        Self {
            properties: StreamProperties {
                sample_rate,
                channels,
                total_samples: (blocks * FRAMES_PER_BLOCK) as u64,
                bits_per_sample: Some(16),
            },
            tags,
            blocks_remaining: blocks,
            calls,
        }
    }
}

impl DecodeAdapter for FakeDecoder {
    fn properties(&self) -> &StreamProperties {
        &self.properties
    }

    fn tags(&self) -> &SourceTags {
        &self.tags
    }

    fn next_block(&mut self) -> Result<Option<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.blocks_remaining == 0 {
            return Ok(None);
        }
        self.blocks_remaining -= 1;
        Ok(Some(vec![
            0.1;
            FRAMES_PER_BLOCK * self.properties.channels as usize
        ]))
    }
}

/// Emits a fixed number of bytes per block, numbered by block, plus a
/// fixed flush tail.
struct FakeEncoder {
    block_index: u8,
}

impl FakeEncoder {
    fn new() -> Self {
        Self { block_index: 0 }
    }
}

impl EncodeAdapter for FakeEncoder {
    fn worst_case_len(&self, frames: usize) -> usize {
        frames * CHANNELS as usize + FLUSH_LEN
    }

    fn encode_into(&mut self, _samples: &[f32], out: &mut [MaybeUninit<u8>]) -> Result<usize> {
        self.block_index = self.block_index.wrapping_add(1);
        for slot in out.iter_mut().take(BYTES_PER_BLOCK) {
            slot.write(self.block_index);
        }
        Ok(BYTES_PER_BLOCK)
    }

    fn flush_into(&mut self, out: &mut [MaybeUninit<u8>]) -> Result<usize> {
        for slot in out.iter_mut().take(FLUSH_LEN) {
            slot.write(FLUSH_MARKER);
        }
        Ok(FLUSH_LEN)
    }
}

fn scripted_session(blocks: usize) -> (TranscodeSession, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let decoder = FakeDecoder::new(blocks, Arc::clone(&calls));
    let session = TranscodeSession::from_parts(
        Box::new(decoder),
        Box::new(FakeEncoder::new()),
        &TranscodeConfig::default(),
        "scripted.flac",
    )
    .unwrap();
    (session, calls)
}

#[test]
fn total_size_is_stable_across_reads() {
    let (mut session, _) = scripted_session(8);
    let size = session.total_size();
    assert!(size > LEGACY_TAG_LEN as u64);

    session.read(0, 64).unwrap();
    session.read(size - 200, 200).unwrap();
    session.read(0, size as usize).unwrap();

    assert_eq!(session.total_size(), size);
}

#[test]
fn tail_probe_never_touches_the_pipeline() {
    let (mut session, calls) = scripted_session(8);
    let size = session.total_size();

    let tail = session
        .read(size - LEGACY_TAG_LEN as u64, LEGACY_TAG_LEN)
        .unwrap();
    assert_eq!(tail.len(), LEGACY_TAG_LEN);
    assert_eq!(&tail[..3], b"TAG");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(session.state(), SessionState::Active);
}

#[test]
fn tail_probe_zero_fills_before_the_trailer() {
    let (mut session, calls) = scripted_session(8);
    let size = session.total_size();

    // Straddle the trailer boundary by 64 bytes on each side.
    let offset = size - LEGACY_TAG_LEN as u64 - 64;
    let out = session.read(offset, 64 + LEGACY_TAG_LEN).unwrap();
    assert_eq!(out.len(), 64 + LEGACY_TAG_LEN);
    assert!(out[..64].iter().all(|&b| b == 0));
    assert_eq!(&out[64..67], b"TAG");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn cached_ranges_are_served_without_decoding() {
    let (mut session, calls) = scripted_session(8);

    // The rendered tag header exists from construction.
    let first = session.read(0, 10).unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(&first[..3], b"ID3");
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let again = session.read(0, 10).unwrap();
    assert_eq!(first, again);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn full_read_finalizes_with_trailer_at_advertised_offset() {
    let (mut session, calls) = scripted_session(8);
    let size = session.total_size();

    let all = session.read(0, size as usize).unwrap();
    assert_eq!(all.len() as u64, size);
    assert_eq!(session.state(), SessionState::Finished);
    assert_eq!(session.produced(), size);
    // 8 blocks plus the end-of-stream pull.
    assert_eq!(calls.load(Ordering::SeqCst), 9);

    let trailer = &all[(size as usize - LEGACY_TAG_LEN)..];
    assert_eq!(&trailer[..3], b"TAG");
    // The title survives into the legacy trailer.
    assert_eq!(&trailer[3..18], b"Scripted Stream");
}

#[test]
fn reads_past_the_end_are_empty_or_clamped() {
    let (mut session, _) = scripted_session(4);
    let size = session.total_size();

    assert!(session.read(size, 100).unwrap().is_empty());
    assert!(session.read(size + 5000, 1).unwrap().is_empty());

    let clamped = session.read(size - 4, 100).unwrap();
    assert_eq!(clamped.len(), 4);
}

#[test]
fn zero_length_reads_are_empty() {
    let (mut session, calls) = scripted_session(4);
    assert!(session.read(0, 0).unwrap().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn chunked_reads_match_a_single_full_read() {
    let (mut whole, _) = scripted_session(6);
    let (mut chunked, _) = scripted_session(6);
    let size = whole.total_size();
    assert_eq!(size, chunked.total_size());

    let all = whole.read(0, size as usize).unwrap();

    let mut assembled = Vec::new();
    let mut offset = 0u64;
    while offset < size {
        let chunk = chunked.read(offset, 1000).unwrap();
        assert!(!chunk.is_empty());
        offset += chunk.len() as u64;
        assembled.extend_from_slice(&chunk);
    }

    assert_eq!(assembled, all);
}

#[test]
fn out_of_order_reads_reuse_the_forward_fill() {
    let (mut session, calls) = scripted_session(6);
    let size = session.total_size();

    // A mid-file read fills everything up to its end.
    let mid = session.read(size / 2, 256).unwrap();
    assert_eq!(mid.len(), 256);
    let fills = calls.load(Ordering::SeqCst);
    assert!(fills > 0);

    // Earlier ranges are now cache hits.
    session.read(0, (size / 2) as usize).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), fills);
}

#[test]
fn produced_is_monotonic_until_finalize() {
    let (mut session, _) = scripted_session(6);
    let size = session.total_size();

    let mut last = session.produced();
    let mut offset = 0u64;
    while session.state() == SessionState::Active {
        session.read(offset, 500).unwrap();
        offset += 500;
        assert!(session.produced() >= last);
        last = session.produced();
    }
    assert_eq!(session.produced(), size);
}

#[test]
fn mono_session_size_is_header_plus_estimate_plus_trailer() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut decoder = FakeDecoder::with_stream(1, 1, 44100, Arc::clone(&calls));
    decoder.properties.total_samples = 1000;

    let header = render_frames(&TagMapper::map(
        decoder.tags(),
        decoder.properties().duration_ms(),
    ))
    .unwrap();

    let mut session = TranscodeSession::from_parts(
        Box::new(decoder),
        Box::new(FakeEncoder::new()),
        &TranscodeConfig::default(),
        "mono.flac",
    )
    .unwrap();

    // 1000 samples round to one MP3 frame, plus the two-frame slack:
    // 3 * 144 * 128 kbps * 1000 / 44100 Hz = 1254 audio bytes.
    let expected = header.len() as u64 + 1254 + LEGACY_TAG_LEN as u64;
    assert_eq!(session.total_size(), expected);

    let all = session.read(0, expected as usize).unwrap();
    assert_eq!(all.len() as u64, expected);
    assert_eq!(session.state(), SessionState::Finished);
    assert_eq!(&all[..header.len()], &header[..]);
    assert_eq!(&all[(expected as usize - LEGACY_TAG_LEN)..][..3], b"TAG");

    // An identical mono session read in small chunks produces the same bytes.
    let mut chunked_decoder =
        FakeDecoder::with_stream(1, 1, 44100, Arc::new(AtomicUsize::new(0)));
    chunked_decoder.properties.total_samples = 1000;
    let mut chunked = TranscodeSession::from_parts(
        Box::new(chunked_decoder),
        Box::new(FakeEncoder::new()),
        &TranscodeConfig::default(),
        "mono.flac",
    )
    .unwrap();

    let mut assembled = Vec::new();
    let mut offset = 0u64;
    while offset < expected {
        let chunk = chunked.read(offset, 256).unwrap();
        assert!(!chunk.is_empty());
        offset += chunk.len() as u64;
        assembled.extend_from_slice(&chunk);
    }
    assert_eq!(assembled, all);
}

#[test]
fn low_sample_rate_streams_construct_without_fault() {
    let calls = Arc::new(AtomicUsize::new(0));
    let decoder = FakeDecoder::with_stream(2, 1, 50, calls);
    let session = TranscodeSession::from_parts(
        Box::new(decoder),
        Box::new(FakeEncoder::new()),
        &TranscodeConfig::default(),
        "slow.flac",
    )
    .unwrap();
    assert!(session.total_size() > LEGACY_TAG_LEN as u64);
}

#[test]
fn virtual_file_serves_size_and_ranges() {
    let (session, _) = scripted_session(4);
    let file = VirtualFile::from_session(session);
    let size = file.size();

    let head = file.read_at(0, 3).unwrap();
    assert_eq!(&head[..], b"ID3");
    assert!(!file.is_finished());

    let all = file.read_at(0, size as usize).unwrap();
    assert_eq!(all.len() as u64, size);
    assert!(file.is_finished());
    assert_eq!(file.size(), size);
}

#[test]
fn opening_garbage_is_a_construction_error() {
    let mut source = tempfile::Builder::new()
        .suffix(".flac")
        .tempfile()
        .unwrap();
    source.write_all(b"this is not audio at all").unwrap();
    source.flush().unwrap();

    let err = VirtualFile::open(source.path(), &TranscodeConfig::default())
        .err()
        .expect("open should fail");
    assert!(err.is_construction_error());
}

#[test]
fn opening_a_missing_file_fails() {
    let err = VirtualFile::open(
        std::path::Path::new("/definitely/missing.mp3"),
        &TranscodeConfig::default(),
    )
    .err()
    .expect("open should fail");
    assert!(matches!(err, TranscodeError::SourceOpen(_)));
}
