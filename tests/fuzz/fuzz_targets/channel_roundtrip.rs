//! Fuzz target for the encode/decode round trip.
//!
//! Any image must decode back to its quantized values at any quality.

#![no_main]

use arbitrary::Arbitrary;
use huffpix::{codec, EncodeOptions, Quality, RgbPlanes};
use libfuzzer_sys::fuzz_target;

/// Structured input for round-trip fuzzing.
#[derive(Arbitrary, Debug)]
struct RoundTripInput {
    /// Image width (clamped to 0-63)
    width: u8,
    /// Image height (clamped to 0-63)
    height: u8,
    /// Quality selector (mapped to 1-10)
    quality: u8,
    /// Interleaved RGB data
    data: Vec<u8>,
}

fuzz_target!(|input: RoundTripInput| {
    let width = input.width as u32 % 64;
    let height = input.height as u32 % 64;
    let expected_len = (width * height * 3) as usize;

    if input.data.len() < expected_len {
        return;
    }

    let planes = RgbPlanes::from_interleaved_rgb(&input.data[..expected_len], width, height)
        .expect("length checked above");
    let quality = Quality::new(input.quality % 10 + 1).expect("1-10");

    let encoded = codec::encode(&planes, &EncodeOptions::with_quality(quality))
        .expect("valid planes always encode");
    let decoded = codec::decode(&encoded).expect("own output always decodes");

    assert_eq!(decoded.quality, quality);
    if quality == Quality::LOSSLESS {
        assert_eq!(decoded.planes.to_interleaved_rgb(), &input.data[..expected_len]);
    }
    for (source, result) in planes.planes.iter().zip(&decoded.planes.planes) {
        for (&v, &w) in source.iter().zip(result) {
            assert_eq!(w, quality.dequantize(quality.quantize(v)));
        }
    }
});
