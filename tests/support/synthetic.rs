//! Synthetic test images.
//!
//! Deterministic patterns for codec and bitmap tests. Generators return
//! interleaved `RGBRGB...` rows, top to bottom; [`planes`] and [`bitmap`]
//! turn them into codec input and 24-bit BMP files.

#![allow(dead_code)]

use huffpix::bmp::encode_bmp;
use huffpix::RgbPlanes;

/// Split interleaved RGB into planes.
pub fn planes(width: u32, height: u32, rgb: &[u8]) -> RgbPlanes {
    RgbPlanes::from_interleaved_rgb(rgb, width, height).expect("generator length")
}

/// Encode interleaved RGB as a bottom-up 24-bit BMP.
pub fn bitmap(width: u32, height: u32, rgb: &[u8]) -> Vec<u8> {
    encode_bmp(&planes(width, height, rgb), None).expect("synthesized bitmap")
}

/// Encode interleaved RGB as a top-down 24-bit BMP (negative height).
pub fn bitmap_top_down(width: u32, height: u32, rgb: &[u8]) -> Vec<u8> {
    let mut shell = huffpix::bmp::standard_shell(width, height).expect("shell");
    shell[22..26].copy_from_slice(&(-(height as i32)).to_le_bytes());
    encode_bmp(&planes(width, height, rgb), Some(&shell)).expect("top-down bitmap")
}

/// A single color.
pub fn solid_color(width: u32, height: u32, r: u8, g: u8, b: u8) -> Vec<u8> {
    let pixel_count = (width * height) as usize;
    let mut pixels = Vec::with_capacity(pixel_count * 3);
    for _ in 0..pixel_count {
        pixels.extend_from_slice(&[r, g, b]);
    }
    pixels
}

/// Red ramps left to right, green top to bottom, blue along the diagonal.
pub fn gradient_rgb(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = ((x * 255) / width.max(1)) as u8;
            let g = ((y * 255) / height.max(1)) as u8;
            let b = (((x + y) * 127) / (width + height).max(1)) as u8;
            pixels.extend_from_slice(&[r, g, b]);
        }
    }
    pixels
}

/// Two colors in square cells.
pub fn checkerboard(
    width: u32,
    height: u32,
    cell_size: u32,
    color1: [u8; 3],
    color2: [u8; 3],
) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    let cell_size = cell_size.max(1);
    for y in 0..height {
        for x in 0..width {
            let color = if ((x / cell_size) + (y / cell_size)) % 2 == 0 {
                color1
            } else {
                color2
            };
            pixels.extend_from_slice(&color);
        }
    }
    pixels
}

/// Horizontal bands cycling through a small palette.
pub fn stripes(width: u32, height: u32, stripe_height: u32, palette: &[[u8; 3]]) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    let stripe_height = stripe_height.max(1);
    for y in 0..height {
        let color = palette[(y / stripe_height) as usize % palette.len()];
        for _x in 0..width {
            pixels.extend_from_slice(&color);
        }
    }
    pixels
}

/// Pseudo-random noise from a simple LCG, reproducible per seed.
pub fn noise(width: u32, height: u32, seed: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    let mut state = seed;

    for _ in 0..(width * height * 3) {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        pixels.push((state >> 16) as u8);
    }
    pixels
}

/// Heavily skewed values: mostly one level with rare outliers, giving a
/// deep, unbalanced tree.
pub fn skewed(width: u32, height: u32) -> Vec<u8> {
    let count = (width * height * 3) as usize;
    (0..count)
        .map(|i| match i {
            i if i % 97 == 0 => 200,
            i if i % 13 == 0 => 100,
            i if i % 5 == 0 => 50,
            _ => 0,
        })
        .collect()
}
