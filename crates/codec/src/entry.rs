//! Traits describing the caller-owned association structures the codec reads
//! from and builds.
//!
//! The encoder only needs iteration over `(key, value)` pairs; the decoder only
//! needs construction with a capacity hint and insertion.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use bytes::Bytes;

/// Map type produced by [`crate::decode`].
pub type ByteMap = HashMap<Vec<u8>, Vec<u8>>;

/// A key or value that may or may not be a byte sequence.
///
/// Returning `None` makes the encoder fail with
/// [`CodecError::InvalidInput`](crate::CodecError::InvalidInput).
pub trait EntryBytes {
    fn entry_bytes(&self) -> Option<&[u8]>;
}

impl EntryBytes for [u8] {
    fn entry_bytes(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl<const N: usize> EntryBytes for [u8; N] {
    fn entry_bytes(&self) -> Option<&[u8]> {
        Some(&self[..])
    }
}

impl EntryBytes for Vec<u8> {
    fn entry_bytes(&self) -> Option<&[u8]> {
        Some(&self[..])
    }
}

impl EntryBytes for Box<[u8]> {
    fn entry_bytes(&self) -> Option<&[u8]> {
        Some(&self[..])
    }
}

impl EntryBytes for Cow<'_, [u8]> {
    fn entry_bytes(&self) -> Option<&[u8]> {
        Some(&self[..])
    }
}

impl EntryBytes for Bytes {
    fn entry_bytes(&self) -> Option<&[u8]> {
        Some(&self[..])
    }
}

impl<T: EntryBytes + ?Sized> EntryBytes for &T {
    fn entry_bytes(&self) -> Option<&[u8]> {
        (**self).entry_bytes()
    }
}

/// `None` is a tombstone, not a byte sequence.
impl<T: EntryBytes> EntryBytes for Option<T> {
    fn entry_bytes(&self) -> Option<&[u8]> {
        self.as_ref().and_then(EntryBytes::entry_bytes)
    }
}

/// A key or value that can hand out a cheap owned handle to its bytes, so the
/// handle can outlive a lock guarding the map it came from.
pub trait ShareBytes {
    fn share_bytes(&self) -> Option<Bytes>;
}

impl ShareBytes for Bytes {
    fn share_bytes(&self) -> Option<Bytes> {
        Some(self.clone())
    }
}

impl<T: ShareBytes> ShareBytes for Option<T> {
    fn share_bytes(&self) -> Option<Bytes> {
        self.as_ref().and_then(ShareBytes::share_bytes)
    }
}

/// A map the decoder can build.
///
/// Inserting an existing key replaces its value.
pub trait EntrySink: Sized {
    fn with_entry_capacity(capacity: usize) -> Self;
    fn insert_entry(&mut self, key: &[u8], value: &[u8]);
}

impl<S: BuildHasher + Default> EntrySink for HashMap<Vec<u8>, Vec<u8>, S> {
    fn with_entry_capacity(capacity: usize) -> Self {
        HashMap::with_capacity_and_hasher(capacity, S::default())
    }

    fn insert_entry(&mut self, key: &[u8], value: &[u8]) {
        self.insert(key.to_vec(), value.to_vec());
    }
}

impl<S: BuildHasher + Default> EntrySink for HashMap<Bytes, Bytes, S> {
    fn with_entry_capacity(capacity: usize) -> Self {
        HashMap::with_capacity_and_hasher(capacity, S::default())
    }

    fn insert_entry(&mut self, key: &[u8], value: &[u8]) {
        self.insert(Bytes::copy_from_slice(key), Bytes::copy_from_slice(value));
    }
}

impl EntrySink for BTreeMap<Vec<u8>, Vec<u8>> {
    fn with_entry_capacity(_capacity: usize) -> Self {
        BTreeMap::new()
    }

    fn insert_entry(&mut self, key: &[u8], value: &[u8]) {
        self.insert(key.to_vec(), value.to_vec());
    }
}
