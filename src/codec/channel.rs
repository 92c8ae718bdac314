//! Single-channel Huffman encode and decode.
//!
//! A channel is a raster-order sequence of quantized symbols. Encoding builds
//! the channel's tree, writes each symbol's code into a bitstream, and keeps
//! the tree and bitstream as the channel payload. Decoding walks the tree bit
//! by bit and stops after exactly `pixel_count` symbols.

use crate::bits::{byte_len, BitReader, BitWriter};
use crate::compress::huffman::MAX_SYMBOLS;
use crate::compress::{build_tree, FrequencyTable, HuffmanTree};
use crate::error::{Error, Result};

/// Everything the container stores for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChannelPayload {
    /// The channel's Huffman tree.
    pub tree: HuffmanTree,
    /// Packed bitstream, `ceil(bit_count / 8)` bytes.
    pub data: Vec<u8>,
    /// Number of meaningful bits in `data`.
    pub bit_count: u64,
}

impl ChannelPayload {
    /// Number of distinct symbols in the channel.
    pub fn distinct_symbols(&self) -> usize {
        self.tree.leaf_count()
    }
}

/// Encode one channel of quantized symbols.
pub fn encode_channel(symbols: &[u8]) -> Result<ChannelPayload> {
    if symbols.len() as u64 > MAX_SYMBOLS {
        return Err(Error::ImageTooLarge {
            pixels: symbols.len() as u64,
            max: MAX_SYMBOLS,
        });
    }

    let frequencies = FrequencyTable::from_symbols(symbols);
    let tree = build_tree(&frequencies)?;

    // Zero bits per pixel: the leaf alone identifies the symbol.
    if tree.len() <= 1 {
        return Ok(ChannelPayload {
            tree,
            data: Vec::new(),
            bit_count: 0,
        });
    }

    let codes = tree.code_table();
    let expected_bits = codes.encoded_bits(&frequencies);
    if expected_bits > MAX_SYMBOLS {
        return Err(Error::ImageTooLarge {
            pixels: expected_bits,
            max: MAX_SYMBOLS,
        });
    }

    let mut writer = BitWriter::with_capacity(byte_len(expected_bits));
    for &symbol in symbols {
        let Some(code) = codes.get(symbol) else {
            unreachable!("every counted symbol has a leaf");
        };
        writer.write_code(code);
    }

    let bit_count = writer.bit_len();
    debug_assert_eq!(bit_count, expected_bits);
    Ok(ChannelPayload {
        tree,
        data: writer.finish(),
        bit_count,
    })
}

/// Decode exactly `pixel_count` symbols from a channel payload.
///
/// The bit count only bounds the reader. Decoding stops on the symbol count,
/// then checks that every declared bit was consumed.
pub fn decode_channel(payload: &ChannelPayload, pixel_count: usize) -> Result<Vec<u8>> {
    let tree = &payload.tree;

    if tree.is_empty() {
        if pixel_count != 0 || payload.bit_count != 0 {
            return Err(Error::MalformedContainer(format!(
                "empty tree cannot produce {pixel_count} pixels from {} bits",
                payload.bit_count
            )));
        }
        return Ok(Vec::new());
    }

    if tree.total_weight() != pixel_count as u64 {
        return Err(Error::MalformedContainer(format!(
            "tree weight {} does not match pixel count {pixel_count}",
            tree.total_weight()
        )));
    }

    if let Some(symbol) = tree.single_symbol() {
        if payload.bit_count != 0 {
            return Err(Error::MalformedContainer(format!(
                "single-symbol channel declares {} bits",
                payload.bit_count
            )));
        }
        return Ok(vec![symbol; pixel_count]);
    }

    let mut reader = BitReader::new(&payload.data, payload.bit_count)?;
    let mut symbols = Vec::with_capacity(pixel_count);
    let mut current = 0u32;

    while symbols.len() < pixel_count {
        let bit = reader.read_bit().map_err(|e| match e {
            Error::BitstreamOverrun { limit } => Error::MalformedContainer(format!(
                "bitstream exhausted after {limit} bits with {} of {pixel_count} pixels decoded",
                symbols.len()
            )),
            other => other,
        })?;

        // Validated trees are strictly binary, so an internal node always
        // has the child we ask for.
        let Some(next) = tree.node(current).child(bit) else {
            unreachable!("walk never rests on a leaf");
        };
        let node = tree.node(next);
        match node.value {
            Some(symbol) if node.is_leaf() => {
                symbols.push(symbol);
                current = 0;
            }
            _ => current = next,
        }
    }

    if reader.remaining() != 0 {
        return Err(Error::MalformedContainer(format!(
            "{pixel_count} pixels used {} of {} declared bits, {} left over",
            reader.bits_consumed(),
            payload.bit_count,
            reader.remaining()
        )));
    }

    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_scenario() {
        let symbols = [0, 0, 0, 1];
        let payload = encode_channel(&symbols).unwrap();
        assert_eq!(payload.tree.len(), 3);
        assert_eq!(payload.bit_count, 4);
        assert_eq!(payload.data.len(), 1);

        let codes = payload.tree.code_table();
        assert_eq!(codes.get(0).unwrap().length, 1);
        assert_eq!(codes.get(1).unwrap().length, 1);

        assert_eq!(decode_channel(&payload, 4).unwrap(), symbols);
    }

    #[test]
    fn test_boundary_scenario_bits() {
        // Symbol 1 (lighter) is the left child: code 0. Symbol 0 is code 1.
        let payload = encode_channel(&[0, 0, 0, 1]).unwrap();
        assert_eq!(payload.data, vec![0b1110_0000]);
    }

    #[test]
    fn test_degenerate_channel() {
        for count in [0usize, 1, 2, 1000] {
            let symbols = vec![17u8; count];
            let payload = encode_channel(&symbols).unwrap();
            assert_eq!(payload.bit_count, 0);
            assert!(payload.data.is_empty());
            let decoded = decode_channel(&payload, count).unwrap();
            assert_eq!(decoded, symbols);
        }
    }

    #[test]
    fn test_zero_pixel_channel_has_empty_tree() {
        let payload = encode_channel(&[]).unwrap();
        assert!(payload.tree.is_empty());
        assert_eq!(decode_channel(&payload, 0).unwrap(), Vec::<u8>::new());
        assert!(decode_channel(&payload, 1).is_err());
    }

    #[test]
    fn test_bit_count_matches_code_lengths() {
        let symbols: Vec<u8> = (0..500u32).map(|i| ((i * 7) % 13) as u8).collect();
        let payload = encode_channel(&symbols).unwrap();
        let codes = payload.tree.code_table();
        let expected: u64 = symbols
            .iter()
            .map(|&s| codes.get(s).unwrap().length as u64)
            .sum();
        assert_eq!(payload.bit_count, expected);
        assert_eq!(payload.data.len(), byte_len(expected));
        assert_eq!(decode_channel(&payload, symbols.len()).unwrap(), symbols);
    }

    #[test]
    fn test_padding_bits_are_not_decoded() {
        // 3 pixels at 1 bit each leave 5 padding bits in the last byte.
        let symbols = [1, 0, 1];
        let payload = encode_channel(&symbols).unwrap();
        assert_eq!(payload.bit_count, 3);
        assert_eq!(decode_channel(&payload, 3).unwrap(), symbols);
    }

    #[test]
    fn test_rejects_missing_bits() {
        let mut payload = encode_channel(&[0, 1, 2, 3, 0, 1]).unwrap();
        payload.bit_count -= 1;
        let err = decode_channel(&payload, 6).unwrap_err();
        assert!(matches!(err, Error::MalformedContainer(_)));
    }

    #[test]
    fn test_rejects_extra_bits() {
        let mut payload = encode_channel(&[0, 1, 0, 1]).unwrap();
        payload.bit_count += 1;
        let err = decode_channel(&payload, 4).unwrap_err();
        match err {
            Error::MalformedContainer(msg) => assert!(msg.contains("used 4 of 5"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_wrong_pixel_count() {
        let payload = encode_channel(&[0, 1, 0, 1]).unwrap();
        assert!(decode_channel(&payload, 5).is_err());
        assert!(decode_channel(&payload, 3).is_err());
    }

    #[test]
    fn test_rejects_bits_on_single_leaf() {
        let mut payload = encode_channel(&[9, 9, 9]).unwrap();
        payload.bit_count = 8;
        payload.data = vec![0];
        assert!(decode_channel(&payload, 3).is_err());
    }

    #[test]
    fn test_truncated_data() {
        let mut payload = encode_channel(&[0, 1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        payload.data.pop();
        let err = decode_channel(&payload, 9).unwrap_err();
        assert!(matches!(err, Error::TruncatedInput { .. }));
    }
}
