//! Fixed-width little-endian fields: an 8-byte record count and 4-byte lengths.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::CodecError;
use crate::format::Encoding;

/// Width of the record count header.
pub const COUNT_BYTES: usize = 8;

/// Width of each key/value length prefix.
pub const LEN_BYTES: usize = 4;

/// Narrow a field length to the 4-byte prefix, or fail with
/// [`CodecError::LengthOverflow`].
#[inline]
pub fn check_len(len: usize) -> Result<u32, CodecError> {
    u32::try_from(len).map_err(|_| CodecError::LengthOverflow {
        encoding: Encoding::Fixed,
        len: len as u64,
    })
}

#[inline]
pub fn put_len(len: u32, out: &mut Vec<u8>) {
    let mut field = [0u8; LEN_BYTES];
    LittleEndian::write_u32(&mut field, len);
    out.extend_from_slice(&field);
}

#[inline]
pub fn put_count(count: u64, out: &mut Vec<u8>) {
    let mut field = [0u8; COUNT_BYTES];
    LittleEndian::write_u64(&mut field, count);
    out.extend_from_slice(&field);
}
