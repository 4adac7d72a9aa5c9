//! Where encoded buckets come from.

use std::collections::HashMap;
use std::convert::Infallible;
use std::error::Error as StdError;

use bucket::INDEX_BYTES;

/// Storage key of a bucket: its packed index.
pub type BucketKey = [u8; INDEX_BYTES];

/// Read access to the encoded bucket blobs of the surrounding store.
pub trait BucketStore {
    type Error: StdError + Send + Sync + 'static;

    /// Current blob for `bucket`, or `None` if the bucket was never written.
    fn load(&self, bucket: &BucketKey) -> Result<Option<Vec<u8>>, Self::Error>;
}

/// In-memory [`BucketStore`].
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    buckets: HashMap<BucketKey, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, bucket: BucketKey, blob: Vec<u8>) {
        self.buckets.insert(bucket, blob);
    }

    /// Store every `(bucket, blob)` pair, e.g. the output of
    /// [`BucketBatch::drain`](crate::BucketBatch::drain).
    pub fn apply<I: IntoIterator<Item = (BucketKey, Vec<u8>)>>(&mut self, writes: I) {
        self.buckets.extend(writes);
    }

    pub fn get(&self, bucket: &BucketKey) -> Option<&[u8]> {
        self.buckets.get(bucket).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl BucketStore for MemoryStore {
    type Error = Infallible;

    fn load(&self, bucket: &BucketKey) -> Result<Option<Vec<u8>>, Infallible> {
        Ok(self.buckets.get(bucket).cloned())
    }
}
