//! Color channels and planar RGB images.
//!
//! The codec never looks at interleaved pixels: every image is split into
//! three planes, one per channel, each in raster order (row-major, left to
//! right, top to bottom).

use crate::error::{Error, Result};

/// One color channel. The declaration order is the container order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channel {
    /// Red intensity.
    Red,
    /// Green intensity.
    Green,
    /// Blue intensity.
    Blue,
}

impl Channel {
    /// All channels in container order.
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Position of this channel in container order.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase channel name.
    pub const fn name(self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        }
    }
}

/// A planar RGB image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbPlanes {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// One plane per channel, indexed by [`Channel::index`].
    pub planes: [Vec<u8>; 3],
}

impl RgbPlanes {
    /// Build from three planes, checking each holds `width * height` values.
    pub fn new(width: u32, height: u32, red: Vec<u8>, green: Vec<u8>, blue: Vec<u8>) -> Result<Self> {
        let planes = Self {
            width,
            height,
            planes: [red, green, blue],
        };
        planes.validate()?;
        Ok(planes)
    }

    /// Split interleaved `RGBRGB...` bytes into planes.
    pub fn from_interleaved_rgb(data: &[u8], width: u32, height: u32) -> Result<Self> {
        let pixel_count = pixel_count(width, height)?;
        let expected = pixel_count
            .checked_mul(3)
            .ok_or(Error::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(Error::InvalidDataLength {
                expected,
                actual: data.len(),
            });
        }

        let mut red = Vec::with_capacity(pixel_count);
        let mut green = Vec::with_capacity(pixel_count);
        let mut blue = Vec::with_capacity(pixel_count);
        for rgb in data.chunks_exact(3) {
            red.push(rgb[0]);
            green.push(rgb[1]);
            blue.push(rgb[2]);
        }

        Ok(Self {
            width,
            height,
            planes: [red, green, blue],
        })
    }

    /// Interleave the planes back into `RGBRGB...` bytes.
    pub fn to_interleaved_rgb(&self) -> Vec<u8> {
        let [red, green, blue] = &self.planes;
        red.iter()
            .zip(green)
            .zip(blue)
            .flat_map(|((&r, &g), &b)| [r, g, b])
            .collect()
    }

    /// Borrow one channel's plane.
    #[inline]
    pub fn plane(&self, channel: Channel) -> &[u8] {
        &self.planes[channel.index()]
    }

    /// Number of pixels in each plane.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.planes[0].len()
    }

    /// Check that every plane holds exactly `width * height` values.
    pub fn validate(&self) -> Result<()> {
        let expected = pixel_count(self.width, self.height)?;
        for plane in &self.planes {
            if plane.len() != expected {
                return Err(Error::InvalidDataLength {
                    expected,
                    actual: plane.len(),
                });
            }
        }
        Ok(())
    }
}

/// `width * height` as a `usize`, rejecting overflow.
pub fn pixel_count(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(Error::InvalidDimensions { width, height })
}
