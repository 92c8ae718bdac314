//! Bit-level I/O for channel bitstreams.
//!
//! Both sides pack bits MSB first: the first bit of a stream lands in the most
//! significant position of byte 0. The final byte is zero-padded, so a reader
//! needs the exact bit length of the stream, not just its byte length.

use crate::compress::Code;
use crate::error::{Error, Result};

/// Number of bytes needed to hold `bit_len` bits.
#[inline]
pub fn byte_len(bit_len: u64) -> usize {
    bit_len.div_ceil(8) as usize
}

/// Append-only bit writer, MSB first, zero-padded.
#[derive(Debug)]
pub struct BitWriter {
    buffer: Vec<u8>,
    current_byte: u8,
    bit_position: u8, // Counts from 8 down to 0
    bit_len: u64,
}

impl BitWriter {
    /// Create a new bit writer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create a new bit writer with specified byte capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            current_byte: 0,
            bit_position: 8,
            bit_len: 0,
        }
    }

    /// Write the low `num_bits` of `value`, most significant of those first.
    #[inline]
    pub fn write_bits(&mut self, value: u64, num_bits: u8) {
        debug_assert!(num_bits <= 64);

        let mut remaining = num_bits;
        while remaining > 0 {
            let to_write = remaining.min(self.bit_position);

            // Take the top `to_write` of the bits still pending.
            let shift = remaining - to_write;
            let mask = (1u64 << to_write) - 1;
            let bits = ((value >> shift) & mask) as u8;

            self.bit_position -= to_write;
            self.current_byte |= bits << self.bit_position;
            remaining -= to_write;

            if self.bit_position == 0 {
                self.buffer.push(self.current_byte);
                self.current_byte = 0;
                self.bit_position = 8;
            }
        }
        self.bit_len += num_bits as u64;
    }

    /// Write a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(bit as u64, 1);
    }

    /// Write a Huffman code, first path step first.
    #[inline]
    pub fn write_code(&mut self, code: Code) {
        self.write_bits(code.bits, code.length);
    }

    /// Total number of bits written so far.
    pub fn bit_len(&self) -> u64 {
        self.bit_len
    }

    /// Flush the partial byte (zero-padded) and return the buffer.
    ///
    /// The returned buffer is exactly [`byte_len`]`(self.bit_len())` bytes.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        if self.bit_position < 8 {
            self.buffer.push(self.current_byte);
        }
        self.buffer
    }

    /// True if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Bit reader over a byte buffer with an explicit bit-length bound.
///
/// Reading past the bound is an error, never a silent zero: the padding bits
/// in the last byte must not be mistaken for data.
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    limit: u64,
    pos: u64,
}

impl<'a> BitReader<'a> {
    /// Create a reader over the first `bit_len` bits of `data`.
    ///
    /// Fails with [`Error::TruncatedInput`] if `data` is shorter than
    /// `ceil(bit_len / 8)` bytes.
    pub fn new(data: &'a [u8], bit_len: u64) -> Result<Self> {
        let needed = byte_len(bit_len);
        if data.len() < needed {
            return Err(Error::TruncatedInput {
                needed,
                available: data.len(),
            });
        }
        Ok(Self {
            data,
            limit: bit_len,
            pos: 0,
        })
    }

    /// Read the next bit, MSB first.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.pos >= self.limit {
            return Err(Error::BitstreamOverrun { limit: self.limit });
        }
        let byte = self.data[(self.pos / 8) as usize];
        let shift = 7 - (self.pos % 8) as u32;
        self.pos += 1;
        Ok((byte >> shift) & 1 == 1)
    }

    /// Number of bits read so far.
    pub fn bits_consumed(&self) -> u64 {
        self.pos
    }

    /// Number of bits left before the bound.
    pub fn remaining(&self) -> u64 {
        self.limit - self.pos
    }
}
