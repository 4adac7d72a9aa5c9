//! # Shard
//!
//! Write staging for a key/value store that keeps its records in buckets.
//!
//! Instead of one stored value per key, the store holds one value per
//! bucket: the whole bucket's map, encoded with [`codec`]. Keys are routed to
//! buckets with [`bucket`]'s djb2 hash, so the layout is stable across
//! processes and platforms.
//!
//! Fixed-width records addressed by a dense index use [`PageBatch`] instead:
//! index `i` lives in page `i / page_size` at slot `i % page_size`, and a
//! drain overwrites the touched slots of each page in place.
//!
//! ## Example
//! ```rust
//! use shard::{BucketBatch, MemoryStore, ShardConfig};
//!
//! let mut store = MemoryStore::new();
//! let mut batch = BucketBatch::new(&ShardConfig::default()).unwrap();
//!
//! batch.put(b"hello".to_vec(), b"world".to_vec());
//! store.apply(batch.drain(&store).unwrap());
//!
//! batch.clear_cache();
//! assert_eq!(batch.get(&store, b"hello").unwrap(), Some(b"world".to_vec()));
//! ```

mod batch;
mod config;
mod error;
mod page;
mod store;

pub use batch::BucketBatch;
pub use config::{PageConfig, ShardConfig, DEFAULT_NUM_BUCKETS, DEFAULT_PAGE_SIZE};
pub use error::ShardError;
pub use page::PageBatch;
pub use store::{BucketKey, BucketStore, MemoryStore};
