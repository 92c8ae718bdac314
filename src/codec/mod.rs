//! Three-channel image encode and decode.
//!
//! Encoding quantizes each plane, Huffman-codes each quantized plane with its
//! own tree, and writes the container. Decoding runs the same steps in
//! reverse. Channels share no state, so with the `parallel` feature they are
//! processed on separate rayon tasks; the symbol loop inside a channel always
//! stays sequential.
//!
//! # Example
//!
//! ```rust
//! use huffpix::codec::{self, EncodeOptions};
//! use huffpix::RgbPlanes;
//!
//! let planes = RgbPlanes::new(2, 2, vec![0, 0, 0, 1], vec![9; 4], vec![200; 4])?;
//! let bytes = codec::encode(&planes, &EncodeOptions::lossless())?;
//! let decoded = codec::decode(&bytes)?;
//! assert_eq!(decoded.planes, planes);
//! # Ok::<(), huffpix::Error>(())
//! ```

pub mod channel;

use crate::color::{pixel_count, Channel, RgbPlanes};
use crate::compress::huffman::MAX_SYMBOLS;
use crate::container::Container;
use crate::error::{Error, Result};
use crate::quantize::Quality;

use channel::{decode_channel, encode_channel, ChannelPayload};

/// Options for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Quantization quality (1-10, default 8).
    pub quality: Quality,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
        }
    }
}

impl EncodeOptions {
    /// Options with an explicit quality.
    pub fn with_quality(quality: Quality) -> Self {
        Self { quality }
    }

    /// Quality 10: step 1, decoded planes equal the input.
    pub fn lossless() -> Self {
        Self::with_quality(Quality::LOSSLESS)
    }

    /// Quality 6: step 5, a middle ground between size and fidelity.
    pub fn balanced() -> Self {
        Self::with_quality(Quality::BALANCED)
    }

    /// Quality 1: step 10, the smallest output.
    pub fn smallest() -> Self {
        Self::with_quality(Quality::SMALLEST)
    }
}

/// Per-channel encode statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Distinct quantized symbols (leaves in the tree).
    pub distinct_symbols: usize,
    /// Tree nodes written to the container.
    pub tree_nodes: usize,
    /// Bitstream length in bits.
    pub bit_count: u64,
    /// Serialized tree plus bitstream bytes.
    pub payload_bytes: usize,
}

impl ChannelStats {
    fn of(payload: &ChannelPayload) -> Self {
        Self {
            distinct_symbols: payload.distinct_symbols(),
            tree_nodes: payload.tree.len(),
            bit_count: payload.bit_count,
            payload_bytes: payload.tree.len() * crate::container::NODE_SIZE + payload.data.len(),
        }
    }
}

/// Statistics gathered while encoding one image.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeStats {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Quality the image was encoded at.
    pub quality: Quality,
    /// Pixels per channel.
    pub pixel_count: usize,
    /// Per-channel statistics in [`Channel::ALL`] order.
    pub channels: [ChannelStats; 3],
    /// Total container size, trailer included.
    pub output_bytes: usize,
}

impl EncodeStats {
    /// Average bitstream bits per pixel across the three channels.
    pub fn bits_per_pixel(&self) -> f64 {
        if self.pixel_count == 0 {
            return 0.0;
        }
        let bits: u64 = self.channels.iter().map(|c| c.bit_count).sum();
        bits as f64 / self.pixel_count as f64
    }
}

/// Result of decoding a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Dequantized planes.
    pub planes: RgbPlanes,
    /// Quality recorded in the container.
    pub quality: Quality,
    /// Opaque trailer bytes, typically the source bitmap's shell.
    pub trailer: Vec<u8>,
}

/// Encode planes into a container with an empty trailer.
pub fn encode(planes: &RgbPlanes, options: &EncodeOptions) -> Result<Vec<u8>> {
    encode_with_trailer(planes, options, &[])
}

/// Encode planes into a container ending in `trailer`.
pub fn encode_with_trailer(
    planes: &RgbPlanes,
    options: &EncodeOptions,
    trailer: &[u8],
) -> Result<Vec<u8>> {
    encode_with_stats(planes, options, trailer).map(|(bytes, _)| bytes)
}

/// Encode planes and report per-channel statistics.
pub fn encode_with_stats(
    planes: &RgbPlanes,
    options: &EncodeOptions,
    trailer: &[u8],
) -> Result<(Vec<u8>, EncodeStats)> {
    planes.validate()?;
    let pixels = planes.pixel_count();
    if pixels as u64 > MAX_SYMBOLS {
        return Err(Error::ImageTooLarge {
            pixels: pixels as u64,
            max: MAX_SYMBOLS,
        });
    }

    let quality = options.quality;
    let channels = encode_channels(planes, quality)?;
    let stats_per_channel = [
        ChannelStats::of(&channels[0]),
        ChannelStats::of(&channels[1]),
        ChannelStats::of(&channels[2]),
    ];

    let container = Container {
        width: planes.width,
        height: planes.height,
        quality,
        channels,
        trailer: trailer.to_vec(),
    };
    let bytes = container.to_bytes()?;

    let stats = EncodeStats {
        width: planes.width,
        height: planes.height,
        quality,
        pixel_count: pixels,
        channels: stats_per_channel,
        output_bytes: bytes.len(),
    };
    Ok((bytes, stats))
}

/// Decode a container back into planes.
pub fn decode(data: &[u8]) -> Result<DecodedImage> {
    let container = Container::parse(data)?;
    let pixels = pixel_count(container.width, container.height)?;
    let quality = container.quality;

    let [red, green, blue] = decode_channels(&container.channels, pixels, quality)?;
    let planes = RgbPlanes {
        width: container.width,
        height: container.height,
        planes: [red, green, blue],
    };

    Ok(DecodedImage {
        planes,
        quality,
        trailer: container.trailer,
    })
}

fn encode_plane(plane: &[u8], quality: Quality) -> Result<ChannelPayload> {
    let symbols = quality.quantize_plane(plane);
    encode_channel(&symbols)
}

fn decode_plane(payload: &ChannelPayload, pixels: usize, quality: Quality) -> Result<Vec<u8>> {
    let mut plane = decode_channel(payload, pixels)?;
    quality.dequantize_plane(&mut plane);
    Ok(plane)
}

#[cfg(feature = "parallel")]
fn encode_channels(planes: &RgbPlanes, quality: Quality) -> Result<[ChannelPayload; 3]> {
    let run = |channel: Channel| encode_plane(planes.plane(channel), quality);
    let (red, (green, blue)) = rayon::join(
        || run(Channel::Red),
        || rayon::join(|| run(Channel::Green), || run(Channel::Blue)),
    );
    Ok([red?, green?, blue?])
}

#[cfg(not(feature = "parallel"))]
fn encode_channels(planes: &RgbPlanes, quality: Quality) -> Result<[ChannelPayload; 3]> {
    Ok([
        encode_plane(planes.plane(Channel::Red), quality)?,
        encode_plane(planes.plane(Channel::Green), quality)?,
        encode_plane(planes.plane(Channel::Blue), quality)?,
    ])
}

#[cfg(feature = "parallel")]
fn decode_channels(
    channels: &[ChannelPayload; 3],
    pixels: usize,
    quality: Quality,
) -> Result<[Vec<u8>; 3]> {
    let run = |channel: Channel| decode_plane(&channels[channel.index()], pixels, quality);
    let (red, (green, blue)) = rayon::join(
        || run(Channel::Red),
        || rayon::join(|| run(Channel::Green), || run(Channel::Blue)),
    );
    Ok([red?, green?, blue?])
}

#[cfg(not(feature = "parallel"))]
fn decode_channels(
    channels: &[ChannelPayload; 3],
    pixels: usize,
    quality: Quality,
) -> Result<[Vec<u8>; 3]> {
    let run = |channel: Channel| decode_plane(&channels[channel.index()], pixels, quality);
    Ok([run(Channel::Red)?, run(Channel::Green)?, run(Channel::Blue)?])
}
