//! Wire-format selection and per-field widths.
//!
//! Both layouts are a record count followed by `count` records:
//!
//! ```text
//! fixed:  count (u64 LE) | { key_len (u32 LE) | key | val_len (u32 LE) | val }*
//! varint: count (varint) | { key_len (varint) | key | val_len (varint) | val }*
//! ```
//!
//! The two layouts cannot be told apart from their bytes, so the encoding is
//! always chosen by the caller and must be agreed on out of band.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CodecError;
use crate::{fixed, varint};

/// Which length-prefix scheme a buffer uses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Encoding {
    /// 8-byte count, 4-byte lengths.
    #[default]
    Fixed,
    /// LEB128-style count and lengths.
    Varint,
}

impl Encoding {
    /// Bytes taken by the record count header for `count` records.
    pub fn count_width(self, count: u64) -> usize {
        match self {
            Encoding::Fixed => fixed::COUNT_BYTES,
            Encoding::Varint => varint::encoded_len(count),
        }
    }

    /// Bytes taken by a length prefix for a field of `len` bytes.
    ///
    /// Fails with [`CodecError::LengthOverflow`] when the fixed layout cannot
    /// hold `len` in its 4-byte field.
    pub fn length_width(self, len: usize) -> Result<usize, CodecError> {
        match self {
            Encoding::Fixed => {
                fixed::check_len(len)?;
                Ok(fixed::LEN_BYTES)
            }
            Encoding::Varint => Ok(varint::encoded_len(len as u64)),
        }
    }

    /// Smallest possible encoded record (two empty fields).
    ///
    /// Used to bound how many records a buffer could possibly hold.
    pub fn min_record_len(self) -> usize {
        match self {
            Encoding::Fixed => 2 * fixed::LEN_BYTES,
            Encoding::Varint => 2,
        }
    }
}
