//! Fuzz target for container decoding.
//!
//! Arbitrary bytes must decode or fail with an error, never panic. Inputs
//! that declare very large images are skipped: a single-leaf channel may
//! legitimately expand to billions of pixels.

#![no_main]

use huffpix::container::ContainerHeader;
use libfuzzer_sys::fuzz_target;

const MAX_FUZZ_PIXELS: u64 = 1 << 20;

fuzz_target!(|data: &[u8]| {
    if let Ok(header) = ContainerHeader::parse(data) {
        if header.pixel_count() > MAX_FUZZ_PIXELS {
            return;
        }
    }

    if let Ok(image) = huffpix::decode(data) {
        let pixels = image.planes.pixel_count();
        assert_eq!(pixels as u64, image.planes.width as u64 * image.planes.height as u64);
        for plane in &image.planes.planes {
            assert_eq!(plane.len(), pixels);
        }
    }
});
