//! Stream-level pipeline.
//!
//! Encode: profile -> build tree -> derive codewords -> write header ->
//! pack body. Decode: read header -> rebuild tree -> walk the body.
//! The symbol stream in both directions is `extension + ' ' + content`.

use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};

use sha2::{Digest, Sha256};
use tracing::{debug, trace, warn};

use crate::bitpack::BitPacker;
use crate::codeword::CodewordTable;
use crate::config::{Options, SEPARATOR};
use crate::container::ContainerHeader;
use crate::decoder::TreeWalkDecoder;
use crate::error::{HzipError, Result};
use crate::frequency::FrequencyProfiler;
use crate::tree::HuffmanTree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressStats {
    pub extension: String,
    pub content_bytes: u64,
    pub symbols: u64,
    pub distinct_symbols: usize,
    pub header_bytes: u64,
    pub body_bytes: u64,
    /// SHA-256 of the content, lowercase hex.
    pub digest: String,
}

impl CompressStats {
    pub fn compressed_bytes(&self) -> u64 {
        self.header_bytes + self.body_bytes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompressStats {
    pub extension: String,
    pub content_bytes: u64,
    pub symbols: u64,
    /// SHA-256 of the restored content, lowercase hex.
    pub digest: String,
}

/// Compresses everything `source` yields from its current position.
///
/// The source is read twice, once to profile it and once to encode it, so it
/// must be seekable. `dest` is returned flushed.
pub fn compress<R: Read + Seek, W: Write>(
    extension: &str,
    source: &mut R,
    dest: W,
    options: &Options,
) -> Result<(W, CompressStats)> {
    if extension.as_bytes().contains(&SEPARATOR) {
        return Err(HzipError::SeparatorInExtension(extension.to_string()));
    }
    let start = source.stream_position()?;

    let table = FrequencyProfiler::new(options.buffer_size()).profile(extension.as_bytes(), source)?;
    let tree = HuffmanTree::from_frequencies(&table)?;
    let codes = CodewordTable::from_tree(&tree)?;
    debug!(
        symbols = tree.total_symbols(),
        distinct = tree.leaves().len(),
        "built huffman tree"
    );
    trace!("huffman tree:\n{}", tree.structure());

    let header = ContainerHeader::from_tree(&tree);
    let mut out = BufWriter::with_capacity(options.buffer_size(), dest);
    header.write_to(&mut out)?;
    debug!(width = header.width, bytes = header.encoded_len(), "wrote header");

    source.seek(SeekFrom::Start(start))?;
    let mut hasher = Sha256::default();
    let mut packer = BitPacker::new(out);
    packer.pack(&codes, extension.as_bytes())?;
    packer.pack(&codes, &[SEPARATOR])?;

    let mut content_bytes = 0u64;
    let mut buf = vec![0u8; options.buffer_size()];
    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        hasher.update(&buf[..n]);
        packer.pack(&codes, &buf[..n])?;
        content_bytes += n as u64;
    }

    let symbols = extension.len() as u64 + 1 + content_bytes;
    if symbols != tree.total_symbols() {
        return Err(HzipError::SourceChanged);
    }

    let bits = packer.bits_written();
    let (out, body_bytes) = packer.finish()?;
    let dest = out.into_inner().map_err(|e| e.into_error())?;
    debug!(bits, body_bytes, "packed body");

    Ok((
        dest,
        CompressStats {
            extension: extension.to_string(),
            content_bytes,
            symbols,
            distinct_symbols: tree.leaves().len(),
            header_bytes: header.encoded_len() as u64,
            body_bytes,
            digest: format!("{:x}", hasher.finalize()),
        },
    ))
}

/// Decompresses a container read from `source`.
///
/// `open_dest` is called with the restored extension once it has been
/// decoded, and must return the sink for the content. That sink is returned
/// flushed.
pub fn decompress<R, W, F>(source: R, open_dest: F, options: &Options) -> Result<(W, DecompressStats)>
where
    R: Read,
    W: Write,
    F: FnOnce(&str) -> Result<W>,
{
    let mut input = BufReader::with_capacity(options.buffer_size(), source);
    let header = ContainerHeader::read_from(&mut input)?;
    let tree = header.to_tree()?;
    debug!(
        distinct = header.leaves.len(),
        width = header.width,
        symbols = tree.total_symbols(),
        "read header"
    );
    trace!("huffman tree:\n{}", tree.structure());

    let mut decoder = TreeWalkDecoder::new(&tree, &mut input);
    let mut ext = Vec::new();
    loop {
        match decoder.next_symbol()? {
            Some(SEPARATOR) => break,
            Some(byte) => ext.push(byte),
            None => return Err(HzipError::MissingSeparator),
        }
    }
    let extension = String::from_utf8(ext).map_err(|_| HzipError::InvalidExtension)?;
    debug!(extension = %extension, "restored extension");

    let mut out = BufWriter::with_capacity(options.buffer_size(), open_dest(&extension)?);
    let mut hasher = Sha256::default();
    let mut chunk = Vec::with_capacity(options.buffer_size());
    let mut content_bytes = 0u64;
    while let Some(symbol) = decoder.next_symbol()? {
        chunk.push(symbol);
        if chunk.len() == options.buffer_size() {
            content_bytes += write_chunk(&mut out, &mut hasher, &mut chunk)?;
        }
    }
    content_bytes += write_chunk(&mut out, &mut hasher, &mut chunk)?;
    let symbols = decoder.decoded();
    drop(decoder);

    let trailing = io::copy(&mut input, &mut io::sink())?;
    if trailing > 0 {
        warn!(trailing, "ignoring bytes after the last encoded symbol");
    }

    let dest = out.into_inner().map_err(|e| e.into_error())?;
    Ok((
        dest,
        DecompressStats {
            extension,
            content_bytes,
            symbols,
            digest: format!("{:x}", hasher.finalize()),
        },
    ))
}

fn write_chunk<W: Write>(out: &mut W, hasher: &mut Sha256, chunk: &mut Vec<u8>) -> Result<u64> {
    hasher.update(&chunk[..]);
    out.write_all(chunk)?;
    let n = chunk.len() as u64;
    chunk.clear();
    Ok(n)
}

/// Compresses an in-memory buffer into a complete container.
pub fn compress_bytes(extension: &str, content: &[u8], options: &Options) -> Result<Vec<u8>> {
    let (out, _) = compress(extension, &mut Cursor::new(content), Vec::new(), options)?;
    Ok(out)
}

/// Inverse of [`compress_bytes`]: returns `(extension, content)`.
pub fn decompress_bytes(container: &[u8], options: &Options) -> Result<(String, Vec<u8>)> {
    let (content, stats) = decompress(container, |_| Ok(Vec::new()), options)?;
    Ok((stats.extension, content))
}
