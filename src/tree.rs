//! Deterministic Huffman tree construction.
//!
//! Nodes live in an arena and refer to their children by index. Leaves are
//! seeded in non-increasing frequency order (ascending symbol on ties), and
//! every merge takes the two tail nodes, so the same multiset of
//! `(symbol, frequency)` pairs always yields the same tree on both the
//! encode and the decode side.

use std::fmt::Write as _;

use tracing::trace;

use crate::error::{HzipError, Result};
use crate::frequency::ByteFrequencyTable;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf {
    pub symbol: u8,
    pub freq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffNode {
    Leaf { symbol: u8, freq: u64 },
    Internal { freq: u64, left: NodeId, right: NodeId },
}

impl HuffNode {
    pub fn freq(&self) -> u64 {
        match *self {
            HuffNode::Leaf { freq, .. } | HuffNode::Internal { freq, .. } => freq,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }
}

#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<HuffNode>,
    root: NodeId,
    leaves: Vec<Leaf>,
}

impl HuffmanTree {
    pub fn from_frequencies(table: &ByteFrequencyTable) -> Result<Self> {
        Self::from_leaves(table.leaves())
    }

    /// Builds the tree from `(symbol, frequency)` pairs in any order.
    pub fn from_leaves(mut leaves: Vec<Leaf>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(HzipError::EmptyAlphabet);
        }
        leaves.sort_by(|a, b| b.freq.cmp(&a.freq).then(a.symbol.cmp(&b.symbol)));

        let mut nodes: Vec<HuffNode> = leaves
            .iter()
            .map(|leaf| HuffNode::Leaf {
                symbol: leaf.symbol,
                freq: leaf.freq,
            })
            .collect();
        nodes.reserve(leaves.len() - 1);

        // Working sequence, non-increasing by frequency.
        let mut work: Vec<NodeId> = (0..nodes.len()).collect();
        while work.len() > 1 {
            let (Some(left), Some(right)) = (work.pop(), work.pop()) else {
                return Err(HzipError::Logic("merge with fewer than two nodes".into()));
            };
            let freq = nodes[left]
                .freq()
                .checked_add(nodes[right].freq())
                .ok_or_else(|| HzipError::CorruptHeader("symbol frequencies overflow".into()))?;

            let id = nodes.len();
            nodes.push(HuffNode::Internal { freq, left, right });

            let pos = work
                .iter()
                .position(|&n| nodes[n].freq() < freq)
                .unwrap_or(work.len());
            work.insert(pos, id);
            trace!(id, freq, left, right, pos, "merged nodes");
        }

        Ok(HuffmanTree {
            root: work[0],
            nodes,
            leaves,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &HuffNode {
        &self.nodes[id]
    }

    /// Leaves in seeding order; this is also the header order.
    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    /// Number of symbols the tree was built to encode.
    pub fn total_symbols(&self) -> u64 {
        self.nodes[self.root].freq()
    }

    pub fn max_frequency(&self) -> u64 {
        self.leaves[0].freq
    }

    /// Indented dump of the tree, one node per line.
    pub fn structure(&self) -> String {
        let mut out = String::new();
        self.write_node(&mut out, self.root, 0, "root");
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId, depth: usize, label: &str) {
        let indent = "  ".repeat(depth);
        match self.nodes[id] {
            HuffNode::Leaf { symbol, freq } => {
                let _ = writeln!(out, "{indent}{label}-> Leaf: {symbol:#04x} [weight: {freq}]");
            }
            HuffNode::Internal { freq, left, right } => {
                let _ = writeln!(out, "{indent}{label}-> Internal [weight: {freq}]");
                self.write_node(out, left, depth + 1, "L");
                self.write_node(out, right, depth + 1, "R");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(symbol: u8, freq: u64) -> Leaf {
        Leaf { symbol, freq }
    }

    fn txt_aaab() -> Vec<Leaf> {
        vec![leaf(b't', 2), leaf(b'x', 1), leaf(b' ', 1), leaf(b'a', 3), leaf(b'b', 1)]
    }

    fn symbol_at(tree: &HuffmanTree, path: &[bool]) -> Option<u8> {
        let mut id = tree.root();
        for &bit in path {
            match *tree.node(id) {
                HuffNode::Internal { left, right, .. } => id = if bit { right } else { left },
                HuffNode::Leaf { .. } => return None,
            }
        }
        match *tree.node(id) {
            HuffNode::Leaf { symbol, .. } => Some(symbol),
            HuffNode::Internal { .. } => None,
        }
    }

    #[test]
    fn leaves_are_seeded_by_frequency_then_symbol() {
        let tree = HuffmanTree::from_leaves(txt_aaab()).unwrap();
        assert_eq!(
            tree.leaves(),
            &[leaf(b'a', 3), leaf(b't', 2), leaf(b' ', 1), leaf(b'b', 1), leaf(b'x', 1)]
        );
        assert_eq!(tree.total_symbols(), 8);
        assert_eq!(tree.max_frequency(), 3);
    }

    #[test]
    fn merges_follow_the_tail_and_tie_rule() {
        let tree = HuffmanTree::from_leaves(txt_aaab()).unwrap();
        assert_eq!(symbol_at(&tree, &[false]), Some(b'a'));
        assert_eq!(symbol_at(&tree, &[true, false]), Some(b't'));
        assert_eq!(symbol_at(&tree, &[true, true, false]), Some(b' '));
        assert_eq!(symbol_at(&tree, &[true, true, true, false]), Some(b'x'));
        assert_eq!(symbol_at(&tree, &[true, true, true, true]), Some(b'b'));
    }

    #[test]
    fn internal_frequencies_sum_their_children() {
        let leaves: Vec<Leaf> = (0..=255u8).map(|s| leaf(s, (s as u64 % 7) + 1)).collect();
        let tree = HuffmanTree::from_leaves(leaves).unwrap();
        let mut leaf_count = 0;
        for id in 0..tree.nodes.len() {
            match *tree.node(id) {
                HuffNode::Leaf { .. } => leaf_count += 1,
                HuffNode::Internal { freq, left, right } => {
                    assert_ne!(left, right);
                    assert_eq!(freq, tree.node(left).freq() + tree.node(right).freq());
                }
            }
        }
        assert_eq!(leaf_count, 256);
        assert_eq!(tree.nodes.len(), 511);
    }

    #[test]
    fn input_order_does_not_matter() {
        let mut reversed = txt_aaab();
        reversed.reverse();
        let a = HuffmanTree::from_leaves(txt_aaab()).unwrap();
        let b = HuffmanTree::from_leaves(reversed).unwrap();
        assert_eq!(a.nodes, b.nodes);
        assert_eq!(a.root(), b.root());
    }

    #[test]
    fn single_symbol_root_is_a_leaf() {
        let tree = HuffmanTree::from_leaves(vec![leaf(b' ', 1)]).unwrap();
        assert!(tree.node(tree.root()).is_leaf());
        assert_eq!(tree.total_symbols(), 1);
    }

    #[test]
    fn empty_alphabet_is_rejected() {
        assert!(matches!(
            HuffmanTree::from_leaves(Vec::new()),
            Err(HzipError::EmptyAlphabet)
        ));
    }

    #[test]
    fn overflowing_frequencies_are_rejected() {
        let leaves = vec![leaf(1, u64::MAX), leaf(2, 1)];
        assert!(matches!(
            HuffmanTree::from_leaves(leaves),
            Err(HzipError::CorruptHeader(_))
        ));
    }

    #[test]
    fn structure_lists_every_node() {
        let tree = HuffmanTree::from_leaves(txt_aaab()).unwrap();
        let dump = tree.structure();
        assert_eq!(dump.lines().count(), 9);
        assert!(dump.starts_with("root-> Internal [weight: 8]"));
    }
}
