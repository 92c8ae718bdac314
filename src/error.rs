//! Error types for the huffpix library.

use thiserror::Error;

/// Result type alias for huffpix operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding, decoding, or moving images on disk.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Container header fields are inconsistent, or a tree/bitstream section
    /// does not describe a valid channel.
    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    /// Fewer bytes are available than the declared sizes require.
    #[error("Truncated input: needed {needed} bytes, only {available} available")]
    TruncatedInput {
        /// Number of bytes required.
        needed: usize,
        /// Number of bytes actually present.
        available: usize,
    },

    /// A bit reader was asked for more bits than its declared bound.
    #[error("Bitstream overrun: read past {limit} bits")]
    BitstreamOverrun {
        /// Declared bit length of the stream.
        limit: u64,
    },

    /// Quality parameter outside 1-10.
    #[error("Invalid quality {0}: must be 1-10")]
    InvalidQuality(i32),

    /// Image dimensions cannot be represented.
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },

    /// Channel data length doesn't match width × height.
    #[error("Invalid channel data length: expected {expected} bytes, got {actual}")]
    InvalidDataLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes provided.
        actual: usize,
    },

    /// Image or one of its bitstreams is too large for the container's
    /// 32-bit fields.
    #[error("Image too large: {pixels} exceeds maximum {max}")]
    ImageTooLarge {
        /// Offending pixel or bit count.
        pixels: u64,
        /// Maximum supported value.
        max: u64,
    },

    /// The input is not a well-formed bitmap.
    #[error("Invalid bitmap: {0}")]
    InvalidBitmap(String),

    /// The bitmap is well-formed but uses a variant this crate doesn't handle.
    #[error("Unsupported bitmap: {0}")]
    UnsupportedBitmap(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
