//! Bit-by-bit tree walk that turns the packed body back into symbols.

use std::io::{self, Read};

use bitstream_io::{BigEndian, BitRead, BitReader};

use crate::error::{HzipError, Result};
use crate::tree::{HuffNode, HuffmanTree};

/// Yields exactly `tree.total_symbols()` symbols, then stops. Padding bits in
/// the last byte are never read as symbols.
pub struct TreeWalkDecoder<'t, R: Read> {
    tree: &'t HuffmanTree,
    bits: BitReader<R, BigEndian>,
    expected: u64,
    decoded: u64,
}

impl<'t, R: Read> TreeWalkDecoder<'t, R> {
    pub fn new(tree: &'t HuffmanTree, body: R) -> Self {
        Self {
            tree,
            bits: BitReader::endian(body, BigEndian),
            expected: tree.total_symbols(),
            decoded: 0,
        }
    }

    pub fn decoded(&self) -> u64 {
        self.decoded
    }

    pub fn remaining(&self) -> u64 {
        self.expected - self.decoded
    }

    /// Next symbol, or `None` once the expected count has been produced.
    pub fn next_symbol(&mut self) -> Result<Option<u8>> {
        if self.decoded == self.expected {
            return Ok(None);
        }

        let mut cursor = self.tree.root();
        loop {
            let bit = self.read_bit()?;
            cursor = match *self.tree.node(cursor) {
                HuffNode::Internal { left, right, .. } => {
                    if bit {
                        right
                    } else {
                        left
                    }
                }
                // Single-symbol tree: every bit stands for the root symbol.
                HuffNode::Leaf { .. } => cursor,
            };
            if let HuffNode::Leaf { symbol, .. } = *self.tree.node(cursor) {
                self.decoded += 1;
                return Ok(Some(symbol));
            }
        }
    }

    /// Decodes every remaining symbol into `out`.
    pub fn decode_to_end(&mut self, out: &mut Vec<u8>) -> Result<()> {
        while let Some(symbol) = self.next_symbol()? {
            out.push(symbol);
        }
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool> {
        self.bits.read_bit().map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => HzipError::Truncated {
                decoded: self.decoded,
                expected: self.expected,
            },
            _ => HzipError::Io(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Leaf;
    use std::io::Cursor;

    fn txt_aaab_tree() -> HuffmanTree {
        HuffmanTree::from_leaves(vec![
            Leaf { symbol: b't', freq: 2 },
            Leaf { symbol: b'x', freq: 1 },
            Leaf { symbol: b' ', freq: 1 },
            Leaf { symbol: b'a', freq: 3 },
            Leaf { symbol: b'b', freq: 1 },
        ])
        .unwrap()
    }

    #[test]
    fn decodes_the_packed_body() {
        let tree = txt_aaab_tree();
        let mut decoder = TreeWalkDecoder::new(&tree, Cursor::new(vec![0xBA, 0xC3, 0xC0]));
        let mut out = Vec::new();
        decoder.decode_to_end(&mut out).unwrap();
        assert_eq!(out, b"txt aaab");
        assert_eq!(decoder.decoded(), 8);
        assert_eq!(decoder.next_symbol().unwrap(), None);
    }

    #[test]
    fn padding_bits_are_not_symbols() {
        // 0xC0 ends with six zero bits, each of which would decode as 'a'
        let tree = txt_aaab_tree();
        let mut decoder = TreeWalkDecoder::new(&tree, Cursor::new(vec![0xBA, 0xC3, 0xC0]));
        let mut out = Vec::new();
        decoder.decode_to_end(&mut out).unwrap();
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn missing_last_byte_is_truncation() {
        let tree = txt_aaab_tree();
        let mut decoder = TreeWalkDecoder::new(&tree, Cursor::new(vec![0xBA, 0xC3]));
        let mut out = Vec::new();
        let err = decoder.decode_to_end(&mut out).unwrap_err();
        assert!(matches!(err, HzipError::Truncated { decoded: 7, expected: 8 }));
        assert_eq!(decoder.remaining(), 1);
    }

    #[test]
    fn lone_symbol_consumes_one_bit_each() {
        let tree = HuffmanTree::from_leaves(vec![Leaf { symbol: b' ', freq: 9 }]).unwrap();
        let mut decoder = TreeWalkDecoder::new(&tree, Cursor::new(vec![0x00, 0x00]));
        let mut out = Vec::new();
        decoder.decode_to_end(&mut out).unwrap();
        assert_eq!(out, vec![b' '; 9]);

        let mut short = TreeWalkDecoder::new(&tree, Cursor::new(vec![0x00]));
        assert!(matches!(
            short.decode_to_end(&mut Vec::new()),
            Err(HzipError::Truncated { decoded: 8, expected: 9 })
        ));
    }
}
