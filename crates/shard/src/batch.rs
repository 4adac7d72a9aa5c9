//! Bucketed write staging.

use std::collections::{BTreeMap, HashMap};

use bucket::Bucketer;
use codec::{decode, encode, ByteMap, Encoding};

use crate::config::ShardConfig;
use crate::error::ShardError;
use crate::store::{BucketKey, BucketStore};

/// Staged change for one key. `None` is a delete.
type Staged = HashMap<Vec<u8>, Option<Vec<u8>>>;

/// Buffers puts and deletes grouped by bucket, then rewrites each touched
/// bucket as one encoded blob.
///
/// Every key lives in bucket `djb2(key) % num_buckets`; the bucket's records
/// are stored together as a single value keyed by the packed bucket index.
///
/// # Write Path
///
/// 1. [`put`](Self::put) / [`delete`](Self::delete) record the change under
///    the key's bucket. Nothing is read from the store.
/// 2. [`drain`](Self::drain) loads each touched bucket (or starts from an
///    empty map), applies the staged changes, and re-encodes it.
///
/// # Read Path
///
/// 1. Staged changes for the key (a staged delete hides the stored value).
/// 2. The decoded bucket, loaded from the store once and then cached.
pub struct BucketBatch {
    bucketer: Bucketer,
    encoding: Encoding,
    staged: BTreeMap<BucketKey, Staged>,
    fetched: HashMap<BucketKey, ByteMap>,
}

impl BucketBatch {
    /// Creates an empty batch.
    ///
    /// # Errors
    ///
    /// Fails if `config.num_buckets` is zero.
    pub fn new(config: &ShardConfig) -> Result<Self, ShardError> {
        Ok(Self {
            bucketer: config.validate()?,
            encoding: config.encoding,
            staged: BTreeMap::new(),
            fetched: HashMap::new(),
        })
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Bucket `key` is routed to.
    pub fn bucket_key(&self, key: &[u8]) -> BucketKey {
        self.bucketer.key(key)
    }

    /// Stages `key = value`, replacing any earlier staged change for `key`.
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        let bucket = self.bucket_key(&key);
        self.staged.entry(bucket).or_default().insert(key, Some(value));
    }

    /// Stages removal of `key`.
    pub fn delete(&mut self, key: Vec<u8>) {
        let bucket = self.bucket_key(&key);
        self.staged.entry(bucket).or_default().insert(key, None);
    }

    /// Looks up `key`, preferring staged changes over stored data.
    pub fn get<S: BucketStore>(
        &mut self,
        store: &S,
        key: &[u8],
    ) -> Result<Option<Vec<u8>>, ShardError> {
        let bucket = self.bucket_key(key);
        if let Some(change) = self.staged.get(&bucket).and_then(|s| s.get(key)) {
            return Ok(change.clone());
        }
        Ok(self.fetch(store, &bucket)?.get(key).cloned())
    }

    /// Number of buckets with staged changes.
    pub fn staged_buckets(&self) -> usize {
        self.staged.len()
    }

    /// Number of staged key changes across all buckets.
    pub fn staged_keys(&self) -> usize {
        self.staged.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Drops staged changes without writing them.
    pub fn discard(&mut self) {
        self.staged.clear();
    }

    /// Forgets decoded buckets, so the next read goes back to the store.
    pub fn clear_cache(&mut self) {
        self.fetched.clear();
    }

    /// Merges staged changes into their buckets and returns the new blob of
    /// every touched bucket, in bucket-key order.
    ///
    /// On error nothing is consumed: staged changes and the cache are left as
    /// they were.
    pub fn drain<S: BucketStore>(
        &mut self,
        store: &S,
    ) -> Result<Vec<(BucketKey, Vec<u8>)>, ShardError> {
        let mut merged = Vec::with_capacity(self.staged.len());
        for (bucket, changes) in &self.staged {
            let mut base = match self.fetched.get(bucket) {
                Some(cached) => cached.clone(),
                None => self.load(store, bucket)?,
            };
            for (key, change) in changes {
                match change {
                    Some(value) => base.insert(key.clone(), value.clone()),
                    None => base.remove(key),
                };
            }
            let blob = encode(&base, self.encoding)?;
            merged.push((*bucket, base, blob));
        }

        self.staged.clear();
        let mut out = Vec::with_capacity(merged.len());
        let mut bytes = 0usize;
        for (bucket, base, blob) in merged {
            bytes += blob.len();
            self.fetched.insert(bucket, base);
            out.push((bucket, blob));
        }
        tracing::debug!(
            buckets = out.len(),
            bytes,
            encoding = %self.encoding,
            "bucket batch drained"
        );
        Ok(out)
    }

    fn fetch<S: BucketStore>(
        &mut self,
        store: &S,
        bucket: &BucketKey,
    ) -> Result<&ByteMap, ShardError> {
        if !self.fetched.contains_key(bucket) {
            let map = self.load(store, bucket)?;
            self.fetched.insert(*bucket, map);
        }
        // inserted above when missing
        Ok(&self.fetched[bucket])
    }

    fn load<S: BucketStore>(&self, store: &S, bucket: &BucketKey) -> Result<ByteMap, ShardError> {
        match store.load(bucket).map_err(ShardError::store)? {
            Some(raw) => {
                tracing::trace!(bucket = ?bucket, bytes = raw.len(), "bucket loaded");
                Ok(decode(&raw, self.encoding)?)
            }
            None => Ok(ByteMap::new()),
        }
    }
}
