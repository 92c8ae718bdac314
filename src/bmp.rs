//! 24-bit uncompressed BMP reading and writing.
//!
//! Only the pixel array is interpreted. Everything before it (file header,
//! info header, and any gap up to `bfOffBits`) is the *shell* and is carried
//! through the codec untouched, so a decompressed file keeps the source's
//! headers byte for byte.
//!
//! Rows are stored bottom-up when the header height is positive and top-down
//! when it is negative. Each row is BGR triples padded with zeros to a
//! multiple of 4 bytes. [`RgbPlanes`] are always top-to-bottom.

use std::borrow::Cow;
use std::path::Path;

use crate::color::{pixel_count, RgbPlanes};
use crate::error::{Error, Result};

/// `BM` magic.
const SIGNATURE: [u8; 2] = *b"BM";

/// `BITMAPFILEHEADER` size.
const FILE_HEADER_SIZE: usize = 14;

/// `BITMAPINFOHEADER` size; larger (V4/V5) headers extend it.
const INFO_HEADER_SIZE: usize = 40;

/// Size of a synthesized shell.
pub const STANDARD_SHELL_SIZE: usize = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

const BI_RGB: u32 = 0;

/// Largest accepted width or height.
const MAX_DIMENSION: u32 = 1 << 24;

/// 72 DPI expressed in pixels per meter.
const PIXELS_PER_METER: i32 = 2835;

/// A decoded bitmap: planes plus the bytes preceding the pixel array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Pixel data, top-to-bottom.
    pub planes: RgbPlanes,
    /// File and info headers, verbatim.
    pub shell: Vec<u8>,
}

/// Header fields the adapter relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BmpInfo {
    width: u32,
    height: u32,
    top_down: bool,
    pixel_offset: usize,
}

/// Bytes per stored row, including padding.
#[inline]
fn row_stride(width: u32) -> usize {
    (width as usize * 3).div_ceil(4) * 4
}

#[inline]
fn read_u16(data: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([data[pos], data[pos + 1]])
}

#[inline]
fn read_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

#[inline]
fn read_i32(data: &[u8], pos: usize) -> i32 {
    read_u32(data, pos) as i32
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidBitmap(msg.into())
}

/// Parse and check the headers at the start of `data`.
///
/// `data` must extend at least to the pixel array offset.
fn parse_info(data: &[u8]) -> Result<BmpInfo> {
    if data.len() < STANDARD_SHELL_SIZE {
        return Err(invalid(format!(
            "{} bytes is too short for a bitmap header",
            data.len()
        )));
    }
    if data[..2] != SIGNATURE {
        return Err(invalid("missing BM signature"));
    }

    let pixel_offset = read_u32(data, 10) as usize;
    let info_size = read_u32(data, 14) as usize;
    if info_size < INFO_HEADER_SIZE {
        return Err(Error::UnsupportedBitmap(format!(
            "{info_size}-byte info header (OS/2 core headers are not supported)"
        )));
    }
    let headers_end = FILE_HEADER_SIZE
        .checked_add(info_size)
        .ok_or_else(|| invalid("info header size overflows"))?;
    if pixel_offset < headers_end {
        return Err(invalid(format!(
            "pixel offset {pixel_offset} overlaps the {headers_end}-byte headers"
        )));
    }
    if pixel_offset > data.len() {
        return Err(Error::TruncatedInput {
            needed: pixel_offset,
            available: data.len(),
        });
    }

    let raw_width = read_i32(data, 18);
    let raw_height = read_i32(data, 22);
    let planes = read_u16(data, 26);
    let bits_per_pixel = read_u16(data, 28);
    let compression = read_u32(data, 30);

    if planes != 1 {
        return Err(invalid(format!("plane count {planes}, expected 1")));
    }
    if bits_per_pixel != 24 {
        return Err(Error::UnsupportedBitmap(format!(
            "{bits_per_pixel} bits per pixel (only 24 is supported)"
        )));
    }
    if compression != BI_RGB {
        return Err(Error::UnsupportedBitmap(format!(
            "compression method {compression} (only BI_RGB is supported)"
        )));
    }
    if raw_width < 0 {
        return Err(invalid(format!("negative width {raw_width}")));
    }

    let width = raw_width as u32;
    let height = raw_height.unsigned_abs();
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(Error::InvalidDimensions { width, height });
    }

    Ok(BmpInfo {
        width,
        height,
        top_down: raw_height < 0,
        pixel_offset,
    })
}

/// Stored row index for output row `y`.
#[inline]
fn source_row(info: &BmpInfo, y: usize) -> usize {
    if info.top_down {
        y
    } else {
        info.height as usize - 1 - y
    }
}

/// Decode a 24-bit BMP into top-to-bottom planes and its shell.
pub fn decode_bmp(data: &[u8]) -> Result<Bitmap> {
    let info = parse_info(data)?;
    let stride = row_stride(info.width);
    let pixels = pixel_count(info.width, info.height)?;
    let needed = stride
        .checked_mul(info.height as usize)
        .and_then(|size| size.checked_add(info.pixel_offset))
        .ok_or(Error::InvalidDimensions {
            width: info.width,
            height: info.height,
        })?;
    if data.len() < needed {
        return Err(Error::TruncatedInput {
            needed,
            available: data.len(),
        });
    }

    let pixel_data = &data[info.pixel_offset..needed];
    let row_bytes = info.width as usize * 3;
    let mut red = Vec::with_capacity(pixels);
    let mut green = Vec::with_capacity(pixels);
    let mut blue = Vec::with_capacity(pixels);

    for y in 0..info.height as usize {
        let start = source_row(&info, y) * stride;
        for bgr in pixel_data[start..start + row_bytes].chunks_exact(3) {
            blue.push(bgr[0]);
            green.push(bgr[1]);
            red.push(bgr[2]);
        }
    }

    Ok(Bitmap {
        planes: RgbPlanes {
            width: info.width,
            height: info.height,
            planes: [red, green, blue],
        },
        shell: data[..info.pixel_offset].to_vec(),
    })
}

/// Encode planes as a 24-bit BMP.
///
/// With `Some(shell)`, the shell is written verbatim and its row order is
/// honored; it must describe the same dimensions as `planes` and end exactly
/// at its pixel offset. With `None`, a standard bottom-up 54-byte header is
/// synthesized.
pub fn encode_bmp(planes: &RgbPlanes, shell: Option<&[u8]>) -> Result<Vec<u8>> {
    planes.validate()?;

    let (shell, info) = match shell {
        Some(shell) => {
            let info = parse_info(shell)?;
            if info.width != planes.width || info.height != planes.height {
                return Err(invalid(format!(
                    "shell describes {}x{}, image is {}x{}",
                    info.width, info.height, planes.width, planes.height
                )));
            }
            if info.pixel_offset != shell.len() {
                return Err(invalid(format!(
                    "shell is {} bytes but its pixel offset is {}",
                    shell.len(),
                    info.pixel_offset
                )));
            }
            (Cow::Borrowed(shell), info)
        }
        None => {
            let shell = standard_shell(planes.width, planes.height)?;
            let info = parse_info(&shell)?;
            (Cow::Owned(shell), info)
        }
    };

    let stride = row_stride(info.width);
    let height = info.height as usize;
    let width = info.width as usize;
    let mut output = Vec::with_capacity(shell.len() + stride * height);
    output.extend_from_slice(&shell);

    let [red, green, blue] = &planes.planes;
    let padding = stride - width * 3;
    for stored in 0..height {
        // Stored row order is its own inverse.
        let y = source_row(&info, stored);
        let row = y * width..(y + 1) * width;
        for ((&r, &g), &b) in red[row.clone()].iter().zip(&green[row.clone()]).zip(&blue[row]) {
            output.extend_from_slice(&[b, g, r]);
        }
        output.extend(std::iter::repeat(0).take(padding));
    }

    Ok(output)
}

/// Build a standard 54-byte bottom-up shell for a `width` x `height` image.
pub fn standard_shell(width: u32, height: u32) -> Result<Vec<u8>> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(Error::InvalidDimensions { width, height });
    }
    let image_size = row_stride(width) as u64 * height as u64;
    let file_size = image_size + STANDARD_SHELL_SIZE as u64;
    let file_size = u32::try_from(file_size).map_err(|_| Error::ImageTooLarge {
        pixels: width as u64 * height as u64,
        max: u32::MAX as u64,
    })?;

    let mut shell = Vec::with_capacity(STANDARD_SHELL_SIZE);
    shell.extend_from_slice(&SIGNATURE);
    shell.extend_from_slice(&file_size.to_le_bytes());
    shell.extend_from_slice(&[0; 4]); // reserved
    shell.extend_from_slice(&(STANDARD_SHELL_SIZE as u32).to_le_bytes());

    shell.extend_from_slice(&(INFO_HEADER_SIZE as u32).to_le_bytes());
    shell.extend_from_slice(&(width as i32).to_le_bytes());
    shell.extend_from_slice(&(height as i32).to_le_bytes());
    shell.extend_from_slice(&1u16.to_le_bytes());
    shell.extend_from_slice(&24u16.to_le_bytes());
    shell.extend_from_slice(&BI_RGB.to_le_bytes());
    shell.extend_from_slice(&(image_size as u32).to_le_bytes());
    shell.extend_from_slice(&PIXELS_PER_METER.to_le_bytes());
    shell.extend_from_slice(&PIXELS_PER_METER.to_le_bytes());
    shell.extend_from_slice(&0u32.to_le_bytes()); // colors used
    shell.extend_from_slice(&0u32.to_le_bytes()); // important colors

    debug_assert_eq!(shell.len(), STANDARD_SHELL_SIZE);
    Ok(shell)
}

/// Read and decode a BMP file.
pub fn load_channels(path: impl AsRef<Path>) -> Result<Bitmap> {
    let data = std::fs::read(path)?;
    decode_bmp(&data)
}

/// Encode planes as BMP and write them atomically to `path`.
pub fn store_channels(
    path: impl AsRef<Path>,
    planes: &RgbPlanes,
    shell: Option<&[u8]>,
) -> Result<()> {
    let bytes = encode_bmp(planes, shell)?;
    crate::file::write_atomic(path, &bytes)
}
