//! File-level compress/decompress.
//!
//! Output goes to a sibling temporary file that is renamed into place only
//! after the whole container (or restored file) has been written.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::codec::{self, CompressStats, DecompressStats};
use crate::config::Options;
use crate::error::{HzipError, Result};
use crate::path;

const TEMP_EXT: &str = "tmp"; // For atomic writes

#[derive(Debug, Clone)]
pub struct CompressReport {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub stats: CompressStats,
}

#[derive(Debug, Clone)]
pub struct DecompressReport {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub stats: DecompressStats,
}

fn temp_path(dest: &str) -> PathBuf {
    PathBuf::from(format!("{dest}.{TEMP_EXT}"))
}

/// Moves a finished temporary file over `dest`.
fn commit(file: File, temp: &Path, dest: &Path) -> Result<()> {
    file.sync_all()?;
    drop(file);
    fs::rename(temp, dest)?;
    Ok(())
}

fn discard(temp: &Path) {
    if let Err(e) = fs::remove_file(temp) {
        warn!(path = %temp.display(), error = %e, "could not remove temporary file");
    }
}

/// Compresses `src` into `<stem>.hzip` next to it.
pub fn compress_file(src: &str, options: &Options) -> Result<CompressReport> {
    let extension = path::extension(src)?;
    let dest = path::compressed_path(src)?;
    if dest == src {
        return Err(HzipError::OverwritesSource(dest));
    }
    let temp = temp_path(&dest);
    debug!(source = src, dest = %dest, "compressing");

    let mut source = File::open(src)?;
    let out = File::create(&temp)?;

    let dest = PathBuf::from(dest);
    let stats = match codec::compress(extension, &mut source, out, options) {
        Ok((out, stats)) => {
            if let Err(e) = commit(out, &temp, &dest) {
                discard(&temp);
                return Err(e);
            }
            stats
        }
        Err(e) => {
            discard(&temp);
            return Err(e);
        }
    };

    info!(
        source = src,
        dest = %dest.display(),
        original = stats.content_bytes,
        compressed = stats.compressed_bytes(),
        distinct = stats.distinct_symbols,
        sha256 = %stats.digest,
        "file compressed"
    );
    Ok(CompressReport {
        source: PathBuf::from(src),
        dest,
        stats,
    })
}

/// Restores `<stem>.<ext>` from the container at `src`, where `ext` is the
/// extension stored inside the container.
pub fn decompress_file(src: &str, options: &Options) -> Result<DecompressReport> {
    // Fail on a bad path before touching the file system.
    let stem = path::stem(src)?;
    debug!(source = src, stem, "decompressing");

    let source = File::open(src)?;
    let mut target: Option<(PathBuf, PathBuf)> = None;

    let result = codec::decompress(
        source,
        |extension| {
            let dest = path::restored_path(src, extension)?;
            if dest == src {
                return Err(HzipError::OverwritesSource(dest));
            }
            let temp = temp_path(&dest);
            let file = File::create(&temp)?;
            target = Some((temp, PathBuf::from(dest)));
            Ok(file)
        },
        options,
    );

    let (out, stats) = match result {
        Ok(done) => done,
        Err(e) => {
            if let Some((temp, _)) = &target {
                discard(temp);
            }
            return Err(e);
        }
    };
    let Some((temp, dest)) = target else {
        return Err(HzipError::Logic("decoder finished without an output file".into()));
    };
    if let Err(e) = commit(out, &temp, &dest) {
        discard(&temp);
        return Err(e);
    }

    info!(
        source = src,
        dest = %dest.display(),
        restored = stats.content_bytes,
        sha256 = %stats.digest,
        "file decompressed"
    );
    Ok(DecompressReport {
        source: PathBuf::from(src),
        dest,
        stats,
    })
}

/// Decompresses `.hzip` paths and compresses everything else.
pub fn run(src: &str, options: &Options) -> Result<Outcome> {
    if path::is_container(src) {
        decompress_file(src, options).map(Outcome::Decompressed)
    } else {
        compress_file(src, options).map(Outcome::Compressed)
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Compressed(CompressReport),
    Decompressed(DecompressReport),
}

impl Outcome {
    pub fn summary(&self) -> String {
        match self {
            Outcome::Compressed(r) => format!(
                "File compressed successfully: {} ({} -> {} bytes)",
                r.dest.display(),
                r.stats.content_bytes,
                r.stats.compressed_bytes()
            ),
            Outcome::Decompressed(r) => format!(
                "File decompressed successfully: {} ({} bytes)",
                r.dest.display(),
                r.stats.content_bytes
            ),
        }
    }
}
