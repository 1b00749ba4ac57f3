//! Consensus wire encoding.
//!
//! Little-endian integers, CompactSize length prefixes and the BIP144
//! extended transaction format (`marker = 0x00`, `flag = 0x01`).

use crate::errors::{EncodingError, EncodingResult};

/// Upper bound on any single length prefix (matches the P2P message cap).
pub const MAX_VECTOR_SIZE: u64 = 32 * 1024 * 1024;

/// Cursor over a borrowed byte slice.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Wrap a slice.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Consume `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> EncodingResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(EncodingError::UnexpectedEof {
                offset: self.pos,
                needed: n,
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Consume a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> EncodingResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> EncodingResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> EncodingResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> EncodingResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> EncodingResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> EncodingResult<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64_le(&mut self) -> EncodingResult<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    /// Read a minimally-encoded CompactSize.
    pub fn read_compact_size(&mut self) -> EncodingResult<u64> {
        let start = self.pos;
        let tag = self.read_u8()?;
        let (value, minimal) = match tag {
            0x00..=0xfc => (tag as u64, true),
            0xfd => {
                let v = self.read_u16_le()? as u64;
                (v, v >= 0xfd)
            }
            0xfe => {
                let v = self.read_u32_le()? as u64;
                (v, v > 0xffff)
            }
            0xff => {
                let v = self.read_u64_le()?;
                (v, v > 0xffff_ffff)
            }
        };
        if !minimal {
            return Err(EncodingError::NonMinimalCompactSize(start));
        }
        Ok(value)
    }

    /// Read a CompactSize used as a length and bound-check it.
    pub fn read_length(&mut self) -> EncodingResult<usize> {
        let len = self.read_compact_size()?;
        if len > MAX_VECTOR_SIZE {
            return Err(EncodingError::OversizedLength {
                len,
                max: MAX_VECTOR_SIZE,
            });
        }
        Ok(len as usize)
    }

    /// Read a length-prefixed byte vector.
    pub fn read_var_bytes(&mut self) -> EncodingResult<Vec<u8>> {
        let len = self.read_length()?;
        Ok(self.read_bytes(len)?.to_vec())
    }
}

/// Append a CompactSize.
pub fn write_compact_size(n: u64, out: &mut Vec<u8>) {
    match n {
        0x00..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

/// Append a length-prefixed byte vector.
pub fn write_var_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    write_compact_size(bytes.len() as u64, out);
    out.extend_from_slice(bytes);
}

/// Serialized size of a CompactSize.
pub fn compact_size_len(n: u64) -> usize {
    match n {
        0x00..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Types with a consensus byte representation.
pub trait Encodable {
    /// Append the consensus encoding to `out`.
    fn consensus_encode(&self, out: &mut Vec<u8>);
}

/// Types that can be read back from their consensus encoding.
pub trait Decodable: Sized {
    /// Decode from the reader, leaving it positioned after the value.
    fn consensus_decode(r: &mut Reader<'_>) -> EncodingResult<Self>;
}

/// Encode a value into a fresh buffer.
pub fn serialize<T: Encodable + ?Sized>(value: &T) -> Vec<u8> {
    let mut out = Vec::new();
    value.consensus_encode(&mut out);
    out
}

/// Decode a value that must consume the whole slice.
pub fn deserialize<T: Decodable>(bytes: &[u8]) -> EncodingResult<T> {
    let mut r = Reader::new(bytes);
    let value = T::consensus_decode(&mut r)?;
    if r.remaining() != 0 {
        return Err(EncodingError::TrailingBytes(r.remaining()));
    }
    Ok(value)
}

/// Decode a hex string that must hold exactly one value.
pub fn deserialize_hex<T: Decodable>(hex_str: &str) -> EncodingResult<T> {
    let bytes = hex::decode(hex_str.trim())?;
    deserialize(&bytes)
}
