//! Index-addressed Huffman tree storage.
//!
//! A tree is a flat `Vec<FlatNode>` with the root at index 0. Children are
//! referenced by index, never by pointer, so the in-memory arena and the
//! serialized form are the same thing: serialization writes the nodes in
//! order, deserialization validates them and keeps the vector.

use super::huffman::MAX_CODE_LENGTH;
use crate::error::{Error, Result};

/// Largest possible tree: 256 leaves and 255 internal nodes.
pub const MAX_TREE_NODES: usize = 2 * 256 - 1;

/// On-disk sentinel for "no symbol" and "no child".
pub const ABSENT: i32 = -1;

/// One node of a flattened Huffman tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatNode {
    /// Symbol for leaves, `None` for internal nodes.
    pub value: Option<u8>,
    /// Leaf count, or sum of children's weights.
    pub weight: u32,
    /// Index of the left (bit 0) child.
    pub left: Option<u32>,
    /// Index of the right (bit 1) child.
    pub right: Option<u32>,
}

impl FlatNode {
    /// A leaf carrying `symbol`.
    pub const fn leaf(symbol: u8, weight: u32) -> Self {
        Self {
            value: Some(symbol),
            weight,
            left: None,
            right: None,
        }
    }

    /// An internal node over `left` and `right`.
    pub const fn internal(weight: u32, left: u32, right: u32) -> Self {
        Self {
            value: None,
            weight,
            left: Some(left),
            right: Some(right),
        }
    }

    /// A node is a leaf iff it has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Child to follow for `bit` (false = left, true = right).
    #[inline]
    pub fn child(&self, bit: bool) -> Option<u32> {
        if bit {
            self.right
        } else {
            self.left
        }
    }

    /// On-disk form: `[symbolOrSentinel, weight, leftIndex, rightIndex]`.
    pub fn to_raw(&self) -> [i32; 4] {
        let index = |i: Option<u32>| i.map_or(ABSENT, |i| i as i32);
        [
            self.value.map_or(ABSENT, i32::from),
            self.weight as i32,
            index(self.left),
            index(self.right),
        ]
    }

    /// Parse the on-disk form, checking each field's range.
    ///
    /// Structural checks (leaf vs. internal, index bounds) happen in
    /// [`HuffmanTree::from_nodes`].
    pub fn from_raw(raw: [i32; 4]) -> Result<Self> {
        let [value, weight, left, right] = raw;
        let value = match value {
            ABSENT => None,
            0..=255 => Some(value as u8),
            _ => return Err(malformed(format!("node symbol {value} out of range"))),
        };
        let weight = u32::try_from(weight)
            .map_err(|_| malformed(format!("negative node weight {weight}")))?;
        let index = |i: i32| match i {
            ABSENT => Ok(None),
            i if i >= 0 => Ok(Some(i as u32)),
            _ => Err(malformed(format!("child index {i} is negative"))),
        };
        Ok(Self {
            value,
            weight,
            left: index(left)?,
            right: index(right)?,
        })
    }
}

/// A Huffman tree stored as an arena of [`FlatNode`]s, root at index 0.
///
/// An empty tree describes a channel with no pixels. A single leaf describes
/// a channel with one distinct symbol, coded with zero bits per pixel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HuffmanTree {
    nodes: Vec<FlatNode>,
}

impl HuffmanTree {
    /// The tree of an empty channel.
    pub fn empty() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Validate a deserialized arena and wrap it.
    pub fn from_nodes(nodes: Vec<FlatNode>) -> Result<Self> {
        validate(&nodes)?;
        Ok(Self { nodes })
    }

    /// Wrap an arena produced by the tree builder.
    pub(crate) fn from_built(nodes: Vec<FlatNode>) -> Self {
        debug_assert!(validate(&nodes).is_ok(), "builder produced invalid tree");
        Self { nodes }
    }

    /// The node arena in serialization order.
    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }

    /// Number of nodes (leaves and internal).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True for the tree of an empty channel.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root node, if any.
    pub fn root(&self) -> Option<&FlatNode> {
        self.nodes.first()
    }

    /// Node at `index`. Indices taken from a validated tree are always in bounds.
    #[inline]
    pub fn node(&self, index: u32) -> &FlatNode {
        &self.nodes[index as usize]
    }

    /// Number of leaves (distinct symbols).
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Root weight: the number of symbols the tree was built from.
    pub fn total_weight(&self) -> u64 {
        self.root().map_or(0, |r| r.weight as u64)
    }

    /// The constant symbol of a single-leaf tree.
    pub fn single_symbol(&self) -> Option<u8> {
        match self.nodes.as_slice() {
            [only] if only.is_leaf() => only.value,
            _ => None,
        }
    }
}

fn malformed(msg: impl Into<String>) -> Error {
    Error::MalformedContainer(msg.into())
}

/// Check that `nodes` is a strictly binary tree rooted at index 0 with
/// consistent weights, unique leaf symbols of nonzero weight, and no leaf
/// deeper than [`MAX_CODE_LENGTH`].
fn validate(nodes: &[FlatNode]) -> Result<()> {
    if nodes.is_empty() {
        return Ok(());
    }
    if nodes.len() > MAX_TREE_NODES {
        return Err(malformed(format!(
            "tree has {} nodes, maximum is {MAX_TREE_NODES}",
            nodes.len()
        )));
    }

    let len = nodes.len();
    let mut referenced = vec![false; len];
    let mut seen_symbols = [false; 256];

    for (i, node) in nodes.iter().enumerate() {
        match (node.left, node.right) {
            (None, None) => {
                let symbol = node
                    .value
                    .ok_or_else(|| malformed(format!("leaf {i} has no symbol")))?;
                if node.weight == 0 {
                    return Err(malformed(format!("leaf {i} has zero weight")));
                }
                if std::mem::replace(&mut seen_symbols[symbol as usize], true) {
                    return Err(malformed(format!("symbol {symbol} appears on two leaves")));
                }
            }
            (Some(left), Some(right)) => {
                if node.value.is_some() {
                    return Err(malformed(format!("internal node {i} carries a symbol")));
                }
                let mut child_weight = 0u64;
                for child in [left, right] {
                    let c = child as usize;
                    if c >= len {
                        return Err(malformed(format!(
                            "node {i} references child {c}, tree has {len} nodes"
                        )));
                    }
                    if c == 0 {
                        return Err(malformed(format!("node {i} references the root")));
                    }
                    if std::mem::replace(&mut referenced[c], true) {
                        return Err(malformed(format!("node {c} has two parents")));
                    }
                    child_weight += nodes[c].weight as u64;
                }
                if child_weight != node.weight as u64 {
                    return Err(malformed(format!(
                        "node {i} weight {} differs from children's sum {child_weight}",
                        node.weight
                    )));
                }
            }
            _ => {
                return Err(malformed(format!("node {i} has exactly one child")));
            }
        }
    }

    // Every non-root node has at most one parent and the root has none, so a
    // walk from the root cannot loop. Anything it misses sits on a detached
    // cycle or fragment.
    let mut visited = 0usize;
    let mut stack = vec![(0u32, 0u8)];
    while let Some((index, depth)) = stack.pop() {
        visited += 1;
        let node = &nodes[index as usize];
        if let (Some(left), Some(right)) = (node.left, node.right) {
            if depth >= MAX_CODE_LENGTH {
                return Err(malformed(format!(
                    "node {index} has children below depth {MAX_CODE_LENGTH}"
                )));
            }
            stack.push((left, depth + 1));
            stack.push((right, depth + 1));
        }
    }
    if visited != len {
        return Err(malformed(format!(
            "{} of {len} nodes are unreachable from the root",
            len - visited
        )));
    }

    Ok(())
}
