//! Map encoding.
//!
//! Encoding runs in two phases. [`EncodePlan`] first walks the caller's map,
//! checks that every key and value is a byte sequence, and sums the exact
//! output size. [`EncodePlan::write`] then allocates once and copies the raw
//! bytes. Only the first phase touches the caller's map, so when the map sits
//! behind a lock ([`encode_shared`]) the lock is released before the copy.

use bytes::Bytes;
use parking_lot::Mutex;

use crate::entry::{EntryBytes, ShareBytes};
use crate::error::CodecError;
use crate::format::Encoding;
use crate::{fixed, varint};

/// Entries extracted from a map and sized for one [`Encoding`].
#[derive(Debug)]
pub struct EncodePlan<B> {
    encoding: Encoding,
    entries: Vec<(B, B)>,
    body_len: usize,
}

impl<B: AsRef<[u8]>> EncodePlan<B> {
    fn with_capacity(encoding: Encoding, capacity: usize) -> Self {
        Self {
            encoding,
            entries: Vec::with_capacity(capacity),
            body_len: 0,
        }
    }

    fn push(&mut self, key: B, value: B) -> Result<(), CodecError> {
        let (k, v) = (key.as_ref().len(), value.as_ref().len());
        let record = self.encoding.length_width(k)? + k + self.encoding.length_width(v)? + v;
        self.body_len = self
            .body_len
            .checked_add(record)
            .ok_or(CodecError::LengthOverflow {
                encoding: self.encoding,
                len: u64::MAX,
            })?;
        self.entries.push((key, value));
        Ok(())
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Number of records the buffer will hold.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact size of the buffer [`write`](Self::write) produces.
    pub fn encoded_len(&self) -> usize {
        self.encoding.count_width(self.entries.len() as u64) + self.body_len
    }

    /// Copy phase: allocate the output once and write every record into it.
    pub fn write(self) -> Vec<u8> {
        let total = self.encoded_len();
        let mut out = Vec::with_capacity(total);
        let count = self.entries.len() as u64;

        match self.encoding {
            Encoding::Fixed => {
                fixed::put_count(count, &mut out);
                for (key, value) in &self.entries {
                    let (key, value) = (key.as_ref(), value.as_ref());
                    // lengths were checked against u32 while sizing
                    fixed::put_len(key.len() as u32, &mut out);
                    out.extend_from_slice(key);
                    fixed::put_len(value.len() as u32, &mut out);
                    out.extend_from_slice(value);
                }
            }
            Encoding::Varint => {
                varint::encode(count, &mut out);
                for (key, value) in &self.entries {
                    let (key, value) = (key.as_ref(), value.as_ref());
                    varint::encode(key.len() as u64, &mut out);
                    out.extend_from_slice(key);
                    varint::encode(value.len() as u64, &mut out);
                    out.extend_from_slice(value);
                }
            }
        }

        debug_assert_eq!(out.len(), total);
        tracing::trace!(
            encoding = %self.encoding,
            entries = count,
            bytes = out.len(),
            "map encoded"
        );
        out
    }
}

impl<'a> EncodePlan<&'a [u8]> {
    /// Validation phase over a borrowed map.
    pub fn collect<I, K, V>(entries: I, encoding: Encoding) -> Result<Self, CodecError>
    where
        I: IntoIterator<Item = (&'a K, &'a V)>,
        K: EntryBytes + ?Sized + 'a,
        V: EntryBytes + ?Sized + 'a,
    {
        let entries = entries.into_iter();
        let mut plan = Self::with_capacity(encoding, entries.size_hint().0);
        for (index, (key, value)) in entries.enumerate() {
            let key = key
                .entry_bytes()
                .ok_or(CodecError::InvalidInput { index, what: "key" })?;
            let value = value
                .entry_bytes()
                .ok_or(CodecError::InvalidInput { index, what: "value" })?;
            plan.push(key, value)?;
        }
        Ok(plan)
    }
}

impl EncodePlan<Bytes> {
    /// Validation phase that keeps refcounted handles instead of borrows, so
    /// the plan holds no borrow of the source map.
    pub fn collect_shared<'a, I, K, V>(entries: I, encoding: Encoding) -> Result<Self, CodecError>
    where
        I: IntoIterator<Item = (&'a K, &'a V)>,
        K: ShareBytes + ?Sized + 'a,
        V: ShareBytes + ?Sized + 'a,
    {
        let entries = entries.into_iter();
        let mut plan = Self::with_capacity(encoding, entries.size_hint().0);
        for (index, (key, value)) in entries.enumerate() {
            let key = key
                .share_bytes()
                .ok_or(CodecError::InvalidInput { index, what: "key" })?;
            let value = value
                .share_bytes()
                .ok_or(CodecError::InvalidInput { index, what: "value" })?;
            plan.push(key, value)?;
        }
        Ok(plan)
    }
}

/// Encode a map of byte sequences.
///
/// Records are written in the map's iteration order.
///
/// # Errors
///
/// - [`CodecError::InvalidInput`] if a key or value is not a byte sequence.
/// - [`CodecError::LengthOverflow`] if a key or value is longer than
///   `u32::MAX` under [`Encoding::Fixed`].
pub fn encode<'a, I, K, V>(entries: I, encoding: Encoding) -> Result<Vec<u8>, CodecError>
where
    I: IntoIterator<Item = (&'a K, &'a V)>,
    K: EntryBytes + ?Sized + 'a,
    V: EntryBytes + ?Sized + 'a,
{
    EncodePlan::<&[u8]>::collect(entries, encoding).map(EncodePlan::write)
}

/// Size [`encode`] would produce, without copying any bytes.
pub fn encoded_len<'a, I, K, V>(entries: I, encoding: Encoding) -> Result<usize, CodecError>
where
    I: IntoIterator<Item = (&'a K, &'a V)>,
    K: EntryBytes + ?Sized + 'a,
    V: EntryBytes + ?Sized + 'a,
{
    EncodePlan::<&[u8]>::collect(entries, encoding).map(|plan| plan.encoded_len())
}

/// Encode a map that other threads share through a mutex.
///
/// The lock is held only while entries are validated and their handles are
/// collected; the byte copy runs after the guard is dropped.
pub fn encode_shared<M, K, V>(shared: &Mutex<M>, encoding: Encoding) -> Result<Vec<u8>, CodecError>
where
    M: ?Sized,
    for<'a> &'a M: IntoIterator<Item = (&'a K, &'a V)>,
    K: ShareBytes + 'static,
    V: ShareBytes + 'static,
{
    let plan = {
        let guard = shared.lock();
        EncodePlan::<Bytes>::collect_shared(&*guard, encoding)?
    };
    Ok(plan.write())
}
