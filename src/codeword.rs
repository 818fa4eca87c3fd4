//! Symbol to codeword mapping derived from a [`HuffmanTree`].

use crate::error::{HzipError, Result};
use crate::frequency::ALPHABET_SIZE;
use crate::tree::{HuffNode, HuffmanTree, NodeId};

/// Widest codeword a table can hold. A tree over `u64` frequencies is at
/// most ~92 levels deep, so this is never reached by a valid tree.
pub const MAX_CODEWORD_BITS: u8 = 128;

/// Codeword bits right-aligned in `bits`, first bit is the most significant
/// of the `len` low bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codeword {
    pub bits: u128,
    pub len: u8,
}

impl Codeword {
    /// True when `self` is a bit-prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &Codeword) -> bool {
        self.len <= other.len && other.bits >> (other.len - self.len) == self.bits
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodewordTable {
    codes: [Option<Codeword>; ALPHABET_SIZE],
}

impl CodewordTable {
    pub fn from_tree(tree: &HuffmanTree) -> Result<Self> {
        let mut table = CodewordTable {
            codes: [None; ALPHABET_SIZE],
        };
        match *tree.node(tree.root()) {
            // A lone symbol gets `0` by convention.
            HuffNode::Leaf { symbol, .. } => table.codes[symbol as usize] = Some(Codeword { bits: 0, len: 1 }),
            HuffNode::Internal { .. } => table.assign(tree, tree.root(), 0, 0)?,
        }
        Ok(table)
    }

    fn assign(&mut self, tree: &HuffmanTree, id: NodeId, bits: u128, len: u8) -> Result<()> {
        match *tree.node(id) {
            HuffNode::Leaf { symbol, .. } => {
                self.codes[symbol as usize] = Some(Codeword { bits, len });
            }
            HuffNode::Internal { left, right, .. } => {
                if len >= MAX_CODEWORD_BITS {
                    return Err(HzipError::Logic(format!("codeword longer than {MAX_CODEWORD_BITS} bits")));
                }
                self.assign(tree, left, bits << 1, len + 1)?;
                self.assign(tree, right, (bits << 1) | 1, len + 1)?;
            }
        }
        Ok(())
    }

    pub fn get(&self, symbol: u8) -> Option<Codeword> {
        self.codes[symbol as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, Codeword)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.map(|c| (symbol as u8, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Leaf;
    use proptest::prelude::*;

    fn table_for(pairs: &[(u8, u64)]) -> CodewordTable {
        let leaves = pairs.iter().map(|&(symbol, freq)| Leaf { symbol, freq }).collect();
        CodewordTable::from_tree(&HuffmanTree::from_leaves(leaves).unwrap()).unwrap()
    }

    fn code(bits: u128, len: u8) -> Option<Codeword> {
        Some(Codeword { bits, len })
    }

    #[test]
    fn txt_aaab_codes() {
        let table = table_for(&[(b't', 2), (b'x', 1), (b' ', 1), (b'a', 3), (b'b', 1)]);
        assert_eq!(table.get(b'a'), code(0b0, 1));
        assert_eq!(table.get(b't'), code(0b10, 2));
        assert_eq!(table.get(b' '), code(0b110, 3));
        assert_eq!(table.get(b'x'), code(0b1110, 4));
        assert_eq!(table.get(b'b'), code(0b1111, 4));
        assert_eq!(table.get(b'z'), None);
        assert_eq!(table.iter().count(), 5);
    }

    #[test]
    fn lone_symbol_gets_a_single_zero_bit() {
        let table = table_for(&[(b' ', 1)]);
        assert_eq!(table.get(b' '), code(0, 1));
    }

    #[test]
    fn rebuilding_gives_identical_codes() {
        let pairs: Vec<(u8, u64)> = (0..=255u8).map(|s| (s, (s as u64 * 7919) % 97 + 1)).collect();
        assert_eq!(table_for(&pairs), table_for(&pairs));
    }

    #[test]
    fn fibonacci_frequencies_give_a_deep_tree() {
        let mut fib = vec![1u64, 1];
        while fib.len() < 70 {
            let n = fib[fib.len() - 1] + fib[fib.len() - 2];
            fib.push(n);
        }
        let pairs: Vec<(u8, u64)> = fib.iter().enumerate().map(|(s, &f)| (s as u8, f)).collect();
        let table = table_for(&pairs);
        let longest = table.iter().map(|(_, c)| c.len).max().unwrap();
        assert_eq!(longest, 69);
    }

    proptest! {
        #[test]
        fn codes_are_prefix_free(freqs in prop::collection::vec(1u64..10_000, 2..256)) {
            let pairs: Vec<(u8, u64)> = freqs.iter().enumerate().map(|(s, &f)| (s as u8, f)).collect();
            let table = table_for(&pairs);
            let codes: Vec<Codeword> = table.iter().map(|(_, c)| c).collect();
            prop_assert_eq!(codes.len(), pairs.len());
            for (i, a) in codes.iter().enumerate() {
                prop_assert!(a.len >= 1);
                for (j, b) in codes.iter().enumerate() {
                    if i != j {
                        prop_assert!(!a.is_prefix_of(b));
                    }
                }
            }
        }
    }
}
