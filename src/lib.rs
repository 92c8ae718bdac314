//! # huffpix
//!
//! Lossy per-channel Huffman compression for 24-bit bitmaps.
//!
//! Each 8-bit channel value is quantized by a quality-keyed integer step,
//! then each color channel is entropy-coded with its own Huffman tree. The
//! trees and bitstreams are stored in a compact little-endian container
//! together with the source bitmap's headers, so decompression rebuilds a
//! file with the original shell and approximate pixels.
//!
//! ## Features
//!
//! - **Per-channel Huffman coding** with deterministic tie-breaking
//! - **Quality 1-10**, where 10 is lossless
//! - **24-bit BMP adapter** that preserves headers byte for byte
//! - Optional channel parallelism via the `parallel` feature
//! - A `huffpix` command-line tool via the default `cli` feature
//!
//! ## Example
//!
//! ```rust
//! use huffpix::{codec, EncodeOptions, RgbPlanes};
//!
//! let planes = RgbPlanes::new(2, 1, vec![255, 0], vec![0, 255], vec![10, 10])?;
//! let container = codec::encode(&planes, &EncodeOptions::default())?;
//! let decoded = codec::decode(&container)?;
//! assert_eq!(decoded.planes.width, 2);
//! # Ok::<(), huffpix::Error>(())
//! ```
//!
//! See [`guides::huffman_coding`] and [`guides::container_format`] for the
//! algorithm and the byte layout.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bits;
pub mod bmp;
pub mod codec;
pub mod color;
pub mod compress;
pub mod container;
pub mod error;
pub mod file;
pub mod quantize;

pub mod guides {
    //! Long-form documentation rendered from `docs/`.

    #[doc = include_str!(concat!(env!("OUT_DIR"), "/docs/huffman-coding.md"))]
    pub mod huffman_coding {}

    #[doc = include_str!(concat!(env!("OUT_DIR"), "/docs/container-format.md"))]
    pub mod container_format {}
}

pub use codec::{decode, encode, DecodedImage, EncodeOptions, EncodeStats};
pub use color::{Channel, RgbPlanes};
pub use error::{Error, Result};
pub use quantize::Quality;
