//! # Bucket
//!
//! Routes a record to one of `num_buckets` shards by hashing its key.
//!
//! The hash is djb2 in its additive form (`h = h * 33 + byte`, seeded with
//! 5381) over `u64` with wrapping arithmetic. Stored data is laid out by these
//! indices, so the function must give the same answer on every platform and in
//! every process; the standard library hashers are randomly seeded and are not
//! usable here. Switching to the XOR variant would silently re-route every
//! existing key.
//!
//! Bucket indices travel as 8 little-endian bytes ([`pack_index`]), which is
//! also the key under which the storage layer files the encoded bucket.

use std::num::NonZeroU64;

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

/// djb2 starting value.
pub const DJB2_SEED: u64 = 5381;

/// Width of a packed bucket index.
pub const INDEX_BYTES: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BucketError {
    #[error("number of buckets must be non-zero")]
    DivisionByZero,
    #[error("packed index needs 8 bytes, got {0}")]
    TruncatedBuffer(usize),
}

impl BucketError {
    /// `true` when the caller passed a bad argument rather than bad bytes.
    pub fn is_caller_bug(&self) -> bool {
        matches!(self, Self::DivisionByZero)
    }
}

/// djb2 hash of `bytes`.
#[inline]
pub fn djb2(bytes: &[u8]) -> u64 {
    bytes.iter().fold(DJB2_SEED, |h, &c| {
        h.wrapping_mul(33).wrapping_add(u64::from(c))
    })
}

/// Bucket index of `bytes`, in `[0, num_buckets)`.
pub fn bucket_index(bytes: &[u8], num_buckets: u64) -> Result<u64, BucketError> {
    Bucketer::new(num_buckets).map(|b| b.index(bytes))
}

/// Bucket index of `bytes`, packed as 8 little-endian bytes.
pub fn bucket_of(bytes: &[u8], num_buckets: u64) -> Result<[u8; INDEX_BYTES], BucketError> {
    bucket_index(bytes, num_buckets).map(pack_index)
}

/// Pack any index as 8 little-endian bytes.
#[inline]
pub fn pack_index(index: u64) -> [u8; INDEX_BYTES] {
    let mut out = [0u8; INDEX_BYTES];
    LittleEndian::write_u64(&mut out, index);
    out
}

/// Inverse of [`pack_index`]. Reads the first 8 bytes of `bytes`.
pub fn unpack_index(bytes: &[u8]) -> Result<u64, BucketError> {
    bytes
        .get(..INDEX_BYTES)
        .map(LittleEndian::read_u64)
        .ok_or(BucketError::TruncatedBuffer(bytes.len()))
}

/// A bucket count that has already been checked to be non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucketer {
    num_buckets: NonZeroU64,
}

impl Bucketer {
    pub fn new(num_buckets: u64) -> Result<Self, BucketError> {
        NonZeroU64::new(num_buckets)
            .map(|num_buckets| Self { num_buckets })
            .ok_or(BucketError::DivisionByZero)
    }

    pub fn num_buckets(&self) -> u64 {
        self.num_buckets.get()
    }

    #[inline]
    pub fn index(&self, bytes: &[u8]) -> u64 {
        djb2(bytes) % self.num_buckets
    }

    /// Packed bucket index, usable directly as a storage key.
    #[inline]
    pub fn key(&self, bytes: &[u8]) -> [u8; INDEX_BYTES] {
        pack_index(self.index(bytes))
    }
}
