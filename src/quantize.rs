//! Quality-keyed intensity quantization.
//!
//! Quantization is the only lossy stage of the codec. It runs on raw channel
//! values before entropy coding and is reversed (approximately) after
//! decoding. Quality 10 uses a step of 1 and is lossless; quality 1 uses a
//! step of 10 and keeps only 26 distinct levels per channel.

use crate::error::{Error, Result};

/// Lowest accepted quality.
pub const MIN_QUALITY: u8 = 1;

/// Highest accepted quality (lossless).
pub const MAX_QUALITY: u8 = 10;

/// A validated quality level in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    /// Lossless quality (step 1).
    pub const LOSSLESS: Quality = Quality(MAX_QUALITY);

    /// Mid-range quality (step 5).
    pub const BALANCED: Quality = Quality(6);

    /// Coarsest quality (step 10).
    pub const SMALLEST: Quality = Quality(MIN_QUALITY);

    /// Validate and wrap a quality value.
    pub fn new(quality: u8) -> Result<Self> {
        if (MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            Ok(Self(quality))
        } else {
            Err(Error::InvalidQuality(quality as i32))
        }
    }

    /// The raw quality value.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Quantization step: `11 - quality`, never zero.
    #[inline]
    pub const fn step(self) -> u8 {
        MAX_QUALITY + 1 - self.0
    }

    /// Quantize one raw intensity.
    #[inline]
    pub const fn quantize(self, value: u8) -> u8 {
        value / self.step()
    }

    /// Map a quantized symbol back to an intensity.
    #[inline]
    pub fn dequantize(self, symbol: u8) -> u8 {
        symbol.saturating_mul(self.step())
    }

    /// Quantize a whole channel plane.
    pub fn quantize_plane(self, plane: &[u8]) -> Vec<u8> {
        if self.step() == 1 {
            return plane.to_vec();
        }
        plane.iter().map(|&v| self.quantize(v)).collect()
    }

    /// Dequantize a whole channel plane in place.
    pub fn dequantize_plane(self, plane: &mut [u8]) {
        if self.step() == 1 {
            return;
        }
        for v in plane.iter_mut() {
            *v = self.dequantize(*v);
        }
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(8)
    }
}

impl TryFrom<i32> for Quality {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        u8::try_from(value)
            .map_err(|_| Error::InvalidQuality(value))
            .and_then(Quality::new)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> u8 {
        quality.0
    }
}
