//! Entropy coding building blocks.
//!
//! For background on how these pieces fit together, see
//! [`crate::guides::huffman_coding`].

pub mod frequency;
pub mod huffman;
pub mod tree;

pub use frequency::FrequencyTable;
pub use huffman::{build_tree, Code, CodeTable};
pub use tree::{FlatNode, HuffmanTree};
