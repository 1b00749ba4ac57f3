//! Shared error types.

use thiserror::Error;

/// Result alias for consensus decoding.
pub type EncodingResult<T> = std::result::Result<T, EncodingError>;

/// Errors raised while decoding consensus-serialized data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// Input ended before the structure was complete.
    #[error("unexpected end of data: needed {needed} bytes at offset {offset}")]
    UnexpectedEof {
        /// Offset where the read started
        offset: usize,
        /// Bytes the read required
        needed: usize,
    },

    /// CompactSize was not minimally encoded.
    #[error("non-minimal compact size at offset {0}")]
    NonMinimalCompactSize(usize),

    /// A length prefix exceeded the allowed maximum.
    #[error("length {len} exceeds maximum {max}")]
    OversizedLength {
        /// Declared length
        len: u64,
        /// Allowed maximum
        max: u64,
    },

    /// Segwit marker present with an unknown flag byte.
    #[error("unsupported witness flag {0:#04x}")]
    UnsupportedWitnessFlag(u8),

    /// Witness flag set but every input witness was empty.
    #[error("superfluous witness record")]
    SuperfluousWitness,

    /// Bytes remained after the top-level structure was decoded.
    #[error("{0} trailing bytes after decode")]
    TrailingBytes(usize),

    /// Hex string could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl From<hex::FromHexError> for EncodingError {
    fn from(err: hex::FromHexError) -> Self {
        EncodingError::InvalidHex(err.to_string())
    }
}
