//! Compressed container format.
//!
//! All integers are little-endian `int32`.
//!
//! ```text
//! offset  field
//! 0       width
//! 4       height
//! 8       quality (1-10)
//! 12      red, green, blue tree node counts
//! 24      red, green, blue bit counts
//! 36      per channel (red, green, blue):
//!           node_count × [symbolOrSentinel, weight, leftIndex, rightIndex]
//!           ceil(bit_count / 8) bytes of MSB-first bitstream
//! ...     trailer: remaining bytes, opaque (the source bitmap's shell)
//! ```
//!
//! Absent symbols and child indices are written as -1.

use crate::bits::byte_len;
use crate::codec::channel::ChannelPayload;
use crate::color::Channel;
use crate::compress::huffman::MAX_SYMBOLS;
use crate::compress::tree::{FlatNode, HuffmanTree, MAX_TREE_NODES};
use crate::error::{Error, Result};
use crate::quantize::Quality;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 36;

/// Size of one serialized tree node in bytes.
pub const NODE_SIZE: usize = 16;

/// The fixed-size container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Quality the channels were quantized with.
    pub quality: Quality,
    /// Tree node count per channel, in [`Channel::ALL`] order.
    pub tree_nodes: [u32; 3],
    /// Bitstream bit count per channel, in [`Channel::ALL`] order.
    pub bit_counts: [u32; 3],
}

impl ContainerHeader {
    /// `width * height`.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Serialized size of one channel's tree and bitstream.
    pub fn channel_size(&self, channel: Channel) -> usize {
        let i = channel.index();
        self.tree_nodes[i] as usize * NODE_SIZE + byte_len(self.bit_counts[i] as u64)
    }

    /// Append the 36-byte header to `output`.
    pub fn write(&self, output: &mut Vec<u8>) {
        output.reserve(HEADER_SIZE);
        let fields = [self.width, self.height, self.quality.get() as u32]
            .into_iter()
            .chain(self.tree_nodes)
            .chain(self.bit_counts);
        for field in fields {
            // Constructors keep every field within i32.
            output.extend_from_slice(&(field as i32).to_le_bytes());
        }
    }

    /// Parse and validate the header at the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::TruncatedInput {
                needed: HEADER_SIZE,
                available: data.len(),
            });
        }

        let mut fields = [0i32; 9];
        for (i, field) in fields.iter_mut().enumerate() {
            *field = read_i32(data, i * 4);
        }
        let [width, height, quality, r_nodes, g_nodes, b_nodes, r_bits, g_bits, b_bits] = fields;

        let non_negative = |value: i32, name: &str| {
            u32::try_from(value)
                .map_err(|_| Error::MalformedContainer(format!("negative {name}: {value}")))
        };

        let header = Self {
            width: non_negative(width, "width")?,
            height: non_negative(height, "height")?,
            quality: Quality::try_from(quality)?,
            tree_nodes: [
                non_negative(r_nodes, "red tree node count")?,
                non_negative(g_nodes, "green tree node count")?,
                non_negative(b_nodes, "blue tree node count")?,
            ],
            bit_counts: [
                non_negative(r_bits, "red bit count")?,
                non_negative(g_bits, "green bit count")?,
                non_negative(b_bits, "blue bit count")?,
            ],
        };
        header.check_consistency()?;
        Ok(header)
    }

    fn check_consistency(&self) -> Result<()> {
        let pixels = self.pixel_count();
        if pixels > MAX_SYMBOLS {
            return Err(Error::MalformedContainer(format!(
                "{}x{} exceeds {MAX_SYMBOLS} pixels",
                self.width, self.height
            )));
        }
        for channel in Channel::ALL {
            let nodes = self.tree_nodes[channel.index()] as usize;
            if nodes > MAX_TREE_NODES {
                return Err(Error::MalformedContainer(format!(
                    "{} tree has {nodes} nodes, maximum is {MAX_TREE_NODES}",
                    channel.name()
                )));
            }
            if (nodes == 0) != (pixels == 0) {
                return Err(Error::MalformedContainer(format!(
                    "{} tree has {nodes} nodes for {pixels} pixels",
                    channel.name()
                )));
            }
        }
        Ok(())
    }
}

/// A complete decoded-from-disk or ready-to-write container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Quality the channels were quantized with.
    pub quality: Quality,
    /// Channel payloads in [`Channel::ALL`] order.
    pub channels: [ChannelPayload; 3],
    /// Opaque passthrough bytes.
    pub trailer: Vec<u8>,
}

impl Container {
    /// Build the header, checking every count fits its `int32` field.
    pub fn header(&self) -> Result<ContainerHeader> {
        let limit = i32::MAX as u32;
        if self.width > limit || self.height > limit {
            return Err(Error::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        let mut tree_nodes = [0u32; 3];
        let mut bit_counts = [0u32; 3];
        for channel in Channel::ALL {
            let payload = &self.channels[channel.index()];
            tree_nodes[channel.index()] = payload.tree.len() as u32;
            bit_counts[channel.index()] = u32::try_from(payload.bit_count)
                .ok()
                .filter(|&bits| bits <= limit)
                .ok_or(Error::ImageTooLarge {
                    pixels: payload.bit_count,
                    max: limit as u64,
                })?;
        }

        Ok(ContainerHeader {
            width: self.width,
            height: self.height,
            quality: self.quality,
            tree_nodes,
            bit_counts,
        })
    }

    /// Serialize into `output`, which is cleared first.
    pub fn write_into(&self, output: &mut Vec<u8>) -> Result<()> {
        let header = self.header()?;
        let body: usize = Channel::ALL.iter().map(|&c| header.channel_size(c)).sum();

        output.clear();
        output.reserve(HEADER_SIZE + body + self.trailer.len());
        header.write(output);

        for payload in &self.channels {
            for node in payload.tree.nodes() {
                for field in node.to_raw() {
                    output.extend_from_slice(&field.to_le_bytes());
                }
            }
            let bytes = payload
                .data
                .get(..byte_len(payload.bit_count))
                .ok_or(Error::InvalidDataLength {
                    expected: byte_len(payload.bit_count),
                    actual: payload.data.len(),
                })?;
            output.extend_from_slice(bytes);
        }

        output.extend_from_slice(&self.trailer);
        Ok(())
    }

    /// Serialize into a new buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.write_into(&mut output)?;
        Ok(output)
    }

    /// Parse a container, validating the header, every tree, and every
    /// section length. Trees are checked structurally here; bitstreams are
    /// checked when their channel is decoded.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = ContainerHeader::parse(data)?;
        let mut pos = HEADER_SIZE;

        let mut channels: [ChannelPayload; 3] = Default::default();
        for channel in Channel::ALL {
            let i = channel.index();
            let end = pos + header.channel_size(channel);
            if end > data.len() {
                return Err(Error::TruncatedInput {
                    needed: end,
                    available: data.len(),
                });
            }

            let node_count = header.tree_nodes[i] as usize;
            let mut nodes = Vec::with_capacity(node_count);
            for _ in 0..node_count {
                let raw = [
                    read_i32(data, pos),
                    read_i32(data, pos + 4),
                    read_i32(data, pos + 8),
                    read_i32(data, pos + 12),
                ];
                nodes.push(FlatNode::from_raw(raw)?);
                pos += NODE_SIZE;
            }
            let tree = HuffmanTree::from_nodes(nodes).map_err(|e| match e {
                Error::MalformedContainer(msg) => {
                    Error::MalformedContainer(format!("{} tree: {msg}", channel.name()))
                }
                other => other,
            })?;

            let bit_count = header.bit_counts[i] as u64;
            channels[i] = ChannelPayload {
                tree,
                data: data[pos..end].to_vec(),
                bit_count,
            };
            pos = end;
        }

        Ok(Self {
            width: header.width,
            height: header.height,
            quality: header.quality,
            channels,
            trailer: data[pos..].to_vec(),
        })
    }
}

#[inline]
fn read_i32(data: &[u8], pos: usize) -> i32 {
    i32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::channel::encode_channel;

    fn sample() -> Container {
        Container {
            width: 2,
            height: 2,
            quality: Quality::new(7).unwrap(),
            channels: [
                encode_channel(&[0, 0, 0, 1]).unwrap(),
                encode_channel(&[5, 5, 5, 5]).unwrap(),
                encode_channel(&[1, 2, 3, 4]).unwrap(),
            ],
            trailer: b"shell".to_vec(),
        }
    }

    #[test]
    fn test_header_layout() {
        let bytes = sample().to_bytes().unwrap();
        let ints: Vec<i32> = (0..9).map(|i| read_i32(&bytes, i * 4)).collect();
        assert_eq!(ints, vec![2, 2, 7, 3, 1, 7, 4, 0, 8]);
    }

    #[test]
    fn test_body_layout() {
        let bytes = sample().to_bytes().unwrap();
        // Red root: internal, weight 4, children 1 and 2.
        assert_eq!(read_i32(&bytes, 36), -1);
        assert_eq!(read_i32(&bytes, 40), 4);
        assert_eq!(read_i32(&bytes, 44), 1);
        assert_eq!(read_i32(&bytes, 48), 2);
        // Red bitstream follows its 3 nodes.
        assert_eq!(bytes[36 + 3 * NODE_SIZE], 0b1110_0000);
        // Green: one leaf, no bitstream bytes.
        let green = 36 + 3 * NODE_SIZE + 1;
        assert_eq!(read_i32(&bytes, green), 5);
        assert_eq!(read_i32(&bytes, green + 4), 4);
        assert_eq!(read_i32(&bytes, green + 8), -1);
        assert_eq!(read_i32(&bytes, green + 12), -1);
        assert!(bytes.ends_with(b"shell"));
    }

    #[test]
    fn test_parse_round_trip() {
        let container = sample();
        let bytes = container.to_bytes().unwrap();
        assert_eq!(Container::parse(&bytes).unwrap(), container);
    }

    #[test]
    fn test_truncated_header() {
        let err = Container::parse(&[0u8; 20]).unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedInput {
                needed: 36,
                available: 20
            }
        ));
    }

    #[test]
    fn test_truncated_body() {
        let bytes = sample().to_bytes().unwrap();
        // Drop the trailer and the last byte of the blue bitstream.
        let cut = bytes.len() - b"shell".len() - 1;
        let err = Container::parse(&bytes[..cut]).unwrap_err();
        assert!(matches!(err, Error::TruncatedInput { .. }));
    }

    #[test]
    fn test_rejects_bad_quality() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[8..12].copy_from_slice(&11i32.to_le_bytes());
        assert!(matches!(
            Container::parse(&bytes),
            Err(Error::InvalidQuality(11))
        ));
    }

    #[test]
    fn test_rejects_negative_fields() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[0..4].copy_from_slice(&(-2i32).to_le_bytes());
        assert!(matches!(
            Container::parse(&bytes),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_rejects_child_index_out_of_range() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[48..52].copy_from_slice(&99i32.to_le_bytes());
        assert!(matches!(
            Container::parse(&bytes),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_rejects_tree_for_empty_image() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[0..4].copy_from_slice(&0i32.to_le_bytes());
        assert!(matches!(
            Container::parse(&bytes),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_node_count() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[12..16].copy_from_slice(&512i32.to_le_bytes());
        assert!(matches!(
            Container::parse(&bytes),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_empty_trailer() {
        let mut container = sample();
        container.trailer.clear();
        let bytes = container.to_bytes().unwrap();
        assert!(Container::parse(&bytes).unwrap().trailer.is_empty());
    }
}
