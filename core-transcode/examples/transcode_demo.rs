//! # Virtual File Usage Example
//!
//! Opens a FLAC file as a virtual MP3, prints the stat-style size, then
//! reads the whole virtual file in chunks and writes it out as a real
//! MP3 next to the source.
//!
//! Run with: `cargo run --example transcode_demo --package core-transcode -- /path/to/song.flac`

use core_transcode::{TranscodeConfig, VirtualFile};
use std::io::Write;
use std::path::PathBuf;

const CHUNK_SIZE: usize = 64 * 1024;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let source = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("usage: transcode_demo <source.flac> [bitrate_kbps]");
            std::process::exit(2);
        }
    };
    let config = match std::env::args().nth(2) {
        Some(bitrate) => TranscodeConfig {
            bitrate_kbps: bitrate.parse()?,
            ..TranscodeConfig::default()
        },
        None => TranscodeConfig::default(),
    };

    let file = VirtualFile::open(&source, &config)?;
    println!("virtual size: {} bytes", file.size());

    // Probe the trailer first, the way a file browser stats and sniffs
    // before reading content. This does not start the transcode.
    let tail = file.read_at(file.size().saturating_sub(128), 128)?;
    println!("trailer magic: {:?}", String::from_utf8_lossy(&tail[..3]));

    let target = source.with_extension("demo.mp3");
    let mut out = std::fs::File::create(&target)?;
    let mut offset = 0u64;
    while offset < file.size() {
        let chunk = file.read_at(offset, CHUNK_SIZE)?;
        if chunk.is_empty() {
            break;
        }
        out.write_all(&chunk)?;
        offset += chunk.len() as u64;
    }

    println!("wrote {} bytes to {}", offset, target.display());
    Ok(())
}
