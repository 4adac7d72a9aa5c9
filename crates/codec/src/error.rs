//! Error type shared by every codec operation.

use thiserror::Error;

use crate::format::Encoding;

/// Errors produced while encoding or decoding a map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A key or value handed to the encoder is not a byte sequence
    /// (for example a tombstone in a staging map).
    #[error("entry {index}: {what} is not a byte sequence")]
    InvalidInput { index: usize, what: &'static str },

    /// A length or count does not fit the width the encoding gives it.
    #[error("{encoding} encoding cannot represent length {len}")]
    LengthOverflow { encoding: Encoding, len: u64 },

    /// The decoder needed more bytes than the buffer holds.
    #[error("truncated buffer: needed {needed} bytes at offset {offset}, {remaining} remaining")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
}

impl CodecError {
    /// `true` when the error was caused by the arguments the caller passed in,
    /// `false` when it points at corrupt or foreign input bytes.
    pub fn is_caller_bug(&self) -> bool {
        match self {
            Self::InvalidInput { .. } => true,
            // The fixed encoder is the only producer of fixed-width overflow;
            // varint overflow only comes out of the decoder.
            Self::LengthOverflow { encoding, .. } => *encoding == Encoding::Fixed,
            Self::TruncatedBuffer { .. } => false,
        }
    }
}
