//! Batch configuration.

use bucket::{BucketError, Bucketer};
use codec::Encoding;
use serde::{Deserialize, Serialize};

use crate::error::ShardError;

/// Default number of buckets keys are spread across.
pub const DEFAULT_NUM_BUCKETS: u64 = 1024;

/// How keys are routed to buckets and how each bucket is encoded.
///
/// Changing either field for an existing store re-routes or misreads every
/// stored bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShardConfig {
    pub num_buckets: u64,
    pub encoding: Encoding,
}

impl Default for ShardConfig {
    fn default() -> Self {
        Self {
            num_buckets: DEFAULT_NUM_BUCKETS,
            encoding: Encoding::Fixed,
        }
    }
}

impl ShardConfig {
    /// Check the configuration and build the bucket router it describes.
    pub fn validate(&self) -> Result<Bucketer, ShardError> {
        Ok(Bucketer::new(self.num_buckets)?)
    }
}

/// Default number of slots per page.
pub const DEFAULT_PAGE_SIZE: usize = 1024;

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Shape of a paged list of fixed-width records.
///
/// `slot_width` has no default: it is a property of the stored records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    pub slot_width: usize,
}

impl PageConfig {
    pub fn new(slot_width: usize) -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            slot_width,
        }
    }

    pub fn validate(&self) -> Result<(), ShardError> {
        if self.page_size == 0 {
            return Err(BucketError::DivisionByZero.into());
        }
        if self.slot_width == 0 {
            return Err(ShardError::Config("slot_width must be non-zero"));
        }
        Ok(())
    }
}
