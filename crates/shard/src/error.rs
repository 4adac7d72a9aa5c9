use std::error::Error as StdError;

use bucket::BucketError;
use codec::CodecError;
use patch::PatchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShardError {
    #[error("codec: {0}")]
    Codec(#[from] CodecError),
    #[error("bucket: {0}")]
    Bucket(#[from] BucketError),
    #[error("patch: {0}")]
    Patch(#[from] PatchError),
    #[error("invalid config: {0}")]
    Config(&'static str),
    #[error("store: {0}")]
    Store(#[source] Box<dyn StdError + Send + Sync>),
}

impl ShardError {
    pub(crate) fn store<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Store(Box::new(err))
    }

    /// `true` when retrying with the same arguments cannot succeed because the
    /// arguments themselves are wrong.
    pub fn is_caller_bug(&self) -> bool {
        match self {
            Self::Codec(e) => e.is_caller_bug(),
            Self::Bucket(e) => e.is_caller_bug(),
            Self::Patch(e) => e.is_caller_bug(),
            Self::Config(_) => true,
            Self::Store(_) => false,
        }
    }
}
