//! Variable-length size prefixes.
//!
//! Sizes are written base-128, least significant group first. Every byte
//! except the last has its high bit set. A 64-bit value needs at most ten
//! bytes, and the tenth may only carry the single remaining bit.

use std::io::Read;

use bytes::BufMut;

use crate::error::{AetherError, Result};

/// Longest possible encoding of a size.
pub const MAX_VARINT_LEN: usize = 10;

/// Bytes that can be accumulated before the next group could overflow 64 bits.
const MAX_BYTES_WITHOUT_OVERFLOW: u32 = 9;

/// Writes `size` as a varint.
///
/// The signed value is reinterpreted as its unsigned bit pattern, so negative
/// inputs are representable (as ten-byte encodings) even though decoders treat
/// them as invalid lengths.
pub fn encode_size(buf: &mut impl BufMut, size: i64) {
    let mut value = size as u64;
    while value > 0x7F {
        buf.put_u8(value as u8 | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Number of bytes [`encode_size`] writes for `size`.
pub fn size_len(size: i64) -> usize {
    let bits = 64 - (size as u64).leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Reads one varint from a blocking source.
pub fn decode_size<R: Read + ?Sized>(reader: &mut R) -> Result<i64> {
    let mut decoder = VarintDecoder::new();
    let mut byte = [0u8; 1];
    loop {
        reader.read_exact(&mut byte)?;
        if let Some(value) = decoder.push(byte[0])? {
            return Ok(value as i64);
        }
    }
}

/// Push-style varint accumulator.
///
/// Feed bytes one at a time until [`push`](Self::push) yields the value. The
/// decoder resets itself after each completed value.
#[derive(Debug, Default, Clone, Copy)]
pub struct VarintDecoder {
    value: u64,
    read: u32,
}

impl VarintDecoder {
    pub const fn new() -> Self {
        Self { value: 0, read: 0 }
    }

    /// Adds one byte, returning the decoded value once the last byte is seen.
    pub fn push(&mut self, byte: u8) -> Result<Option<u64>> {
        if self.read == MAX_BYTES_WITHOUT_OVERFLOW {
            // 63 bits are in; the tenth byte holds bit 63 and nothing else.
            if byte > 0b1 {
                *self = Self::new();
                return Err(AetherError::Format(format!(
                    "malformed varint: tenth byte 0x{byte:02X} overflows 64 bits"
                )));
            }
            let value = self.value | (u64::from(byte) << (MAX_BYTES_WITHOUT_OVERFLOW * 7));
            *self = Self::new();
            return Ok(Some(value));
        }

        self.value |= u64::from(byte & 0x7F) << (self.read * 7);
        self.read += 1;

        if byte & 0x80 == 0 {
            Ok(Some(std::mem::take(self).value))
        } else {
            Ok(None)
        }
    }

    /// Returns `true` if no byte of the current value has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.read == 0
    }
}
