//! Byte histogram over the `extension + separator + content` stream.

use std::io::{self, Read};

use tracing::debug;

use crate::config::SEPARATOR;
use crate::error::{HzipError, Result};
use crate::tree::Leaf;

pub const ALPHABET_SIZE: usize = 256;

/// Occurrence count of every byte value in the profiled stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteFrequencyTable {
    counts: [u64; ALPHABET_SIZE],
}

impl ByteFrequencyTable {
    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Nonzero entries in ascending symbol order.
    pub fn leaves(&self) -> Vec<Leaf> {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &freq)| freq > 0)
            .map(|(symbol, &freq)| Leaf {
                symbol: symbol as u8,
                freq,
            })
            .collect()
    }
}

/// Accumulates a [`ByteFrequencyTable`] chunk by chunk.
#[derive(Debug)]
pub struct FrequencyProfiler {
    counts: [u64; ALPHABET_SIZE],
    buffer_size: usize,
}

impl FrequencyProfiler {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            counts: [0; ALPHABET_SIZE],
            buffer_size: buffer_size.max(1),
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            self.counts[byte as usize] += 1;
        }
    }

    /// Counts the extension, one separator, then everything `content` yields.
    pub fn profile<R: Read>(mut self, extension: &[u8], content: &mut R) -> Result<ByteFrequencyTable> {
        self.update(extension);
        self.update(&[SEPARATOR]);

        let mut buf = vec![0u8; self.buffer_size];
        let mut content_bytes = 0u64;
        loop {
            let n = match content.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            self.update(&buf[..n]);
            content_bytes += n as u64;
        }

        let table = self.finish()?;
        debug!(content_bytes, distinct = table.distinct(), "profiled source");
        Ok(table)
    }

    pub fn finish(self) -> Result<ByteFrequencyTable> {
        if self.counts.iter().all(|&c| c == 0) {
            return Err(HzipError::EmptyAlphabet);
        }
        Ok(ByteFrequencyTable {
            counts: self.counts,
        })
    }
}
