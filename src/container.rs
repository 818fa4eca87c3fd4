//! Container header: the `(symbol, frequency)` table the decoder needs to
//! rebuild the encoder's tree.
//!
//! ```text
//! [count: u8][width: u8]{[symbol: u8][freq: width bytes, big-endian]}*count
//! ```
//!
//! `count` stores 256 as `0`. No codewords or tree topology are written.

use std::io::{self, Read, Write};

use crate::error::{HzipError, Result};
use crate::frequency::ALPHABET_SIZE;
use crate::tree::{HuffmanTree, Leaf};

const MAX_WIDTH: u8 = 8;

/// Smallest number of bytes that can hold `max_freq`, never zero.
pub fn frequency_width(max_freq: u64) -> u8 {
    let bits = u64::BITS - max_freq.leading_zeros();
    bits.div_ceil(8).max(1) as u8
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    pub width: u8,
    pub leaves: Vec<Leaf>,
}

impl ContainerHeader {
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        Self {
            width: frequency_width(tree.max_frequency()),
            leaves: tree.leaves().to_vec(),
        }
    }

    pub fn encoded_len(&self) -> usize {
        2 + self.leaves.len() * (1 + self.width as usize)
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        let count = match self.leaves.len() {
            ALPHABET_SIZE => 0,
            n @ 1..ALPHABET_SIZE => n as u8,
            n => return Err(HzipError::Logic(format!("cannot store {n} symbols in a header"))),
        };
        if self.width == 0 || self.width > MAX_WIDTH {
            return Err(HzipError::Logic(format!("frequency width {} out of range", self.width)));
        }
        let width = self.width as usize;
        if let Some(leaf) = self.leaves.iter().find(|l| frequency_width(l.freq) > self.width) {
            return Err(HzipError::Logic(format!(
                "frequency {} does not fit in {width} bytes",
                leaf.freq
            )));
        }

        let mut bytes = Vec::with_capacity(self.encoded_len());
        bytes.push(count);
        bytes.push(self.width);
        for leaf in &self.leaves {
            bytes.push(leaf.symbol);
            bytes.extend_from_slice(&leaf.freq.to_be_bytes()[8 - width..]);
        }
        out.write_all(&bytes)?;
        Ok(())
    }

    pub fn read_from<R: Read>(input: &mut R) -> Result<Self> {
        let mut prefix = [0u8; 2];
        read_header_bytes(input, &mut prefix)?;
        let count = match prefix[0] {
            0 => ALPHABET_SIZE,
            n => n as usize,
        };
        let width = prefix[1];
        if width == 0 || width > MAX_WIDTH {
            return Err(HzipError::CorruptHeader(format!("frequency width {width} out of range")));
        }

        let mut table = vec![0u8; count * (1 + width as usize)];
        read_header_bytes(input, &mut table)?;

        let mut cursor = ByteCursor::new(&table);
        let mut seen = [false; ALPHABET_SIZE];
        let mut leaves = Vec::with_capacity(count);
        for _ in 0..count {
            let symbol = cursor.take(1)?[0];
            let freq = cursor
                .take(width as usize)?
                .iter()
                .fold(0u64, |acc, &b| (acc << 8) | b as u64);
            if freq == 0 {
                return Err(HzipError::CorruptHeader(format!("symbol {symbol:#04x} has zero frequency")));
            }
            if std::mem::replace(&mut seen[symbol as usize], true) {
                return Err(HzipError::CorruptHeader(format!("symbol {symbol:#04x} listed twice")));
            }
            leaves.push(Leaf { symbol, freq });
        }

        Ok(Self { width, leaves })
    }

    pub fn to_tree(&self) -> Result<HuffmanTree> {
        HuffmanTree::from_leaves(self.leaves.clone())
    }
}

fn read_header_bytes<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<()> {
    input.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => HzipError::CorruptHeader("header is truncated".into()),
        _ => HzipError::Io(e),
    })
}

/// Bounds-checked reader over an in-memory byte slice.
struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| HzipError::CorruptHeader("header is truncated".into()))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}
