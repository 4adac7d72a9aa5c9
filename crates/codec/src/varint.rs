//! LEB128-style unsigned integers: 7 payload bits per byte, high bit set on
//! every byte except the last.

use crate::error::CodecError;
use crate::format::Encoding;

/// Longest encoding of a `u64` (ceil(64 / 7)).
pub const MAX_VARINT_BYTES: usize = 10;

/// Number of bytes [`encode`] writes for `value`.
#[inline]
pub fn encoded_len(mut value: u64) -> usize {
    let mut n = 1;
    while value >= 0x80 {
        value >>= 7;
        n += 1;
    }
    n
}

/// Append the varint encoding of `value` to `out`.
#[inline]
pub fn encode(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Decode a varint from `buf` starting at `*pos`, advancing `*pos` past it.
///
/// Running off the end of `buf` before a terminating byte is a
/// [`CodecError::TruncatedBuffer`]; payload past 64 bits is a
/// [`CodecError::LengthOverflow`].
pub fn decode(buf: &[u8], pos: &mut usize) -> Result<u64, CodecError> {
    let start = *pos;
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        let Some(&byte) = buf.get(*pos) else {
            return Err(CodecError::TruncatedBuffer {
                offset: start,
                needed: *pos - start + 1,
                remaining: buf.len().saturating_sub(start),
            });
        };
        *pos += 1;

        let payload = u64::from(byte & 0x7F);
        if shift >= 64 || (shift == 63 && payload > 1) {
            return Err(CodecError::LengthOverflow {
                encoding: Encoding::Varint,
                len: result,
            });
        }
        result |= payload << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}
