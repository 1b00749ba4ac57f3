//! Compact ("nBits") target encoding and derived work/difficulty values.

use primitive_types::U256;

/// Decoded compact target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompactTarget {
    pub target: U256,
    pub negative: bool,
    pub overflow: bool,
}

impl CompactTarget {
    /// Usable as a proof-of-work target.
    pub fn is_valid(&self) -> bool {
        !self.negative && !self.overflow && !self.target.is_zero()
    }
}

/// Expand a compact target.
pub fn compact_to_target(bits: u32) -> CompactTarget {
    let size = bits >> 24;
    let mut word = bits & 0x007f_ffff;
    let negative = word != 0 && (bits & 0x0080_0000) != 0;
    let overflow =
        word != 0 && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));

    let target = if overflow {
        U256::zero()
    } else if size <= 3 {
        word >>= 8 * (3 - size);
        U256::from(word)
    } else {
        U256::from(word) << (8 * (size - 3) as usize)
    };

    CompactTarget {
        target,
        negative,
        overflow,
    }
}

/// Compress a target into compact form.
pub fn target_to_compact(target: U256) -> u32 {
    let mut size = (target.bits() + 7) / 8;
    let mut compact: u64 = if size <= 3 {
        target.low_u64() << (8 * (3 - size))
    } else {
        (target >> (8 * (size - 3))).low_u64()
    };
    // The 0x00800000 bit is the sign bit; move into the next byte instead.
    if compact & 0x0080_0000 != 0 {
        compact >>= 8;
        size += 1;
    }
    (compact as u32) | ((size as u32) << 24)
}

/// Expected number of hashes to meet `bits`, i.e. `2^256 / (target + 1)`.
pub fn block_proof(bits: u32) -> U256 {
    let decoded = compact_to_target(bits);
    if !decoded.is_valid() {
        return U256::zero();
    }
    // 2^256 does not fit; (~target / (target + 1)) + 1 is equivalent.
    (!decoded.target / (decoded.target + U256::one())) + U256::one()
}

/// Difficulty relative to the minimum (`0x1d00ffff`) target.
pub fn difficulty_from_bits(bits: u32) -> f64 {
    let mantissa = bits & 0x00ff_ffff;
    if mantissa == 0 {
        return 0.0;
    }
    let mut shift = (bits >> 24) & 0xff;
    let mut diff = 0x0000_ffff as f64 / mantissa as f64;
    while shift < 29 {
        diff *= 256.0;
        shift += 1;
    }
    while shift > 29 {
        diff /= 256.0;
        shift -= 1;
    }
    diff
}

/// Target as 64 hex characters, most significant byte first.
pub fn target_hex(target: U256) -> String {
    let mut bytes = [0u8; 32];
    target.to_big_endian(&mut bytes);
    hex::encode(bytes)
}
