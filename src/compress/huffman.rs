//! Huffman tree construction and code table generation.
//!
//! Trees are built over the symbols actually present in a channel; symbols
//! with a zero count get no leaf. Codes are the root-to-leaf paths of the
//! tree (left = 0, right = 1), not canonical codes: the tree itself travels
//! in the container, so the decoder needs nothing else.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::frequency::FrequencyTable;
use super::tree::{FlatNode, HuffmanTree};
use crate::error::{Error, Result};

/// Longest code the writer can emit in one call.
///
/// Channels are capped at `i32::MAX` symbols, and a Huffman tree of depth
/// `d` needs a total weight of at least `Fib(d + 2)`, so built trees stay
/// well below this. Deserialized trees are held to it by validation.
pub const MAX_CODE_LENGTH: u8 = 64;

/// Largest channel the container can describe (`int32` fields).
pub const MAX_SYMBOLS: u64 = i32::MAX as u64;

/// A root-to-leaf bit path: `length` bits, right-aligned in `bits`,
/// first step in the most significant position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Code {
    /// The path bits (right-aligned).
    pub bits: u64,
    /// Number of bits in the path.
    pub length: u8,
}

impl Code {
    /// Whether `self` is a prefix of `other` (a code is a prefix of itself).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        if self.length > other.length {
            return false;
        }
        let shift = other.length - self.length;
        let head = other.bits.checked_shr(shift as u32).unwrap_or(0);
        head == self.bits
    }

    fn push(self, bit: bool) -> Code {
        debug_assert!(self.length < MAX_CODE_LENGTH);
        Code {
            bits: (self.bits << 1) | bit as u64,
            length: self.length + 1,
        }
    }
}

/// Code for every symbol present in a tree, indexed by symbol.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: [Option<Code>; 256],
}

impl CodeTable {
    /// The code for `symbol`, or `None` if the tree has no leaf for it.
    #[inline]
    pub fn get(&self, symbol: u8) -> Option<Code> {
        self.codes[symbol as usize]
    }

    /// `(symbol, code)` for every present symbol, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(s, c)| c.map(|c| (s as u8, c)))
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }

    /// True for the table of an empty tree.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bits needed to encode a channel with these frequencies.
    pub fn encoded_bits(&self, frequencies: &FrequencyTable) -> u64 {
        self.iter()
            .map(|(symbol, code)| frequencies.count(symbol) as u64 * code.length as u64)
            .sum()
    }
}

/// A merge candidate, ordered by weight and then by insertion sequence.
///
/// Leaves are inserted in ascending symbol order and each merged node takes
/// the next sequence number, so equal weights always resolve to the
/// earliest-inserted candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Candidate {
    weight: u32,
    sequence: u32,
    index: usize,
}

/// Scratch node used while merging, before the final pre-order layout.
#[derive(Debug, Clone, Copy)]
struct MergeNode {
    symbol: Option<u8>,
    weight: u32,
    children: Option<(usize, usize)>,
}

/// Build the Huffman tree for a channel's frequency table.
///
/// Repeatedly merges the two lightest candidates: the first popped becomes
/// the left child, the second the right child. The result is laid out in
/// pre-order (root, left subtree, right subtree).
///
/// One distinct symbol yields a single leaf; no symbols yield an empty tree.
pub fn build_tree(frequencies: &FrequencyTable) -> Result<HuffmanTree> {
    let total = frequencies.total();
    if total > MAX_SYMBOLS {
        return Err(Error::ImageTooLarge {
            pixels: total,
            max: MAX_SYMBOLS,
        });
    }

    let mut merged: Vec<MergeNode> = Vec::with_capacity(2 * 256);
    let mut heap: BinaryHeap<Reverse<Candidate>> = BinaryHeap::with_capacity(256);
    for (symbol, count) in frequencies.iter_present() {
        let index = merged.len();
        merged.push(MergeNode {
            symbol: Some(symbol),
            weight: count,
            children: None,
        });
        heap.push(Reverse(Candidate {
            weight: count,
            sequence: index as u32,
            index,
        }));
    }

    if heap.is_empty() {
        return Ok(HuffmanTree::empty());
    }

    while heap.len() > 1 {
        let (Some(Reverse(left)), Some(Reverse(right))) = (heap.pop(), heap.pop()) else {
            unreachable!("heap holds at least two candidates");
        };
        // Bounded by `total`, which fits in i32.
        let weight = left.weight + right.weight;
        let index = merged.len();
        merged.push(MergeNode {
            symbol: None,
            weight,
            children: Some((left.index, right.index)),
        });
        heap.push(Reverse(Candidate {
            weight,
            sequence: index as u32,
            index,
        }));
    }

    let root = heap.pop().map(|Reverse(c)| c.index).unwrap_or_default();
    Ok(HuffmanTree::from_built(layout_preorder(&merged, root)))
}

/// Re-index merged nodes in pre-order so the root lands at index 0.
fn layout_preorder(merged: &[MergeNode], root: usize) -> Vec<FlatNode> {
    let mut nodes: Vec<FlatNode> = Vec::with_capacity(merged.len());
    // (merged index, parent slot, is right child)
    let mut stack: Vec<(usize, Option<(usize, bool)>)> = vec![(root, None)];

    while let Some((index, parent)) = stack.pop() {
        let slot = nodes.len();
        let node = merged[index];
        nodes.push(match node.symbol {
            Some(symbol) => FlatNode::leaf(symbol, node.weight),
            None => FlatNode {
                value: None,
                weight: node.weight,
                left: None,
                right: None,
            },
        });

        if let Some((parent_slot, is_right)) = parent {
            let parent = &mut nodes[parent_slot];
            if is_right {
                parent.right = Some(slot as u32);
            } else {
                parent.left = Some(slot as u32);
            }
        }

        if let Some((left, right)) = node.children {
            // Right pushed first so the left subtree is laid out first.
            stack.push((right, Some((slot, true))));
            stack.push((left, Some((slot, false))));
        }
    }

    nodes
}

impl HuffmanTree {
    /// Root-to-leaf code of every leaf.
    ///
    /// Walks the arena with an explicit stack, so skewed trees cannot
    /// exhaust the call stack. A single-leaf tree gives its symbol a
    /// zero-length code.
    pub fn code_table(&self) -> CodeTable {
        let mut codes = [None; 256];
        if self.is_empty() {
            return CodeTable { codes };
        }

        let mut stack: Vec<(u32, Code)> = vec![(0, Code::default())];
        while let Some((index, code)) = stack.pop() {
            let node = self.node(index);
            match (node.left, node.right) {
                (Some(left), Some(right)) => {
                    stack.push((right, code.push(true)));
                    stack.push((left, code.push(false)));
                }
                _ => {
                    if let Some(symbol) = node.value {
                        codes[symbol as usize] = Some(code);
                    }
                }
            }
        }

        CodeTable { codes }
    }
}
