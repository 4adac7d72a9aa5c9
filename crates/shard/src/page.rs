//! Paged write staging for fixed-width records.

use std::collections::{BTreeMap, HashMap};

use bucket::pack_index;
use patch::{patch_slots, PatchError};

use crate::config::PageConfig;
use crate::error::ShardError;
use crate::store::{BucketKey, BucketStore};

/// Staged slot values for one page, keyed by slot.
type Staged = BTreeMap<usize, Vec<u8>>;

/// Buffers writes to a dense list of `slot_width`-byte records stored
/// `page_size` records per page, then rewrites only the touched slots.
///
/// Record `index` lives in page `index / page_size` at slot
/// `index % page_size`. Each page is one stored blob keyed by the packed page
/// number, the same key shape [`BucketBatch`](crate::BucketBatch) uses for
/// bucket indexes.
///
/// Pages are never re-encoded: [`drain`](Self::drain) loads each touched page
/// and overwrites its staged slots byte for byte, so every slot must already
/// exist in the stored page.
pub struct PageBatch {
    page_size: usize,
    slot_width: usize,
    staged: BTreeMap<BucketKey, Staged>,
    fetched: HashMap<BucketKey, Vec<u8>>,
}

impl PageBatch {
    /// Creates an empty batch.
    ///
    /// # Errors
    ///
    /// Fails if `page_size` or `slot_width` is zero.
    pub fn new(config: &PageConfig) -> Result<Self, ShardError> {
        config.validate()?;
        Ok(Self {
            page_size: config.page_size,
            slot_width: config.slot_width,
            staged: BTreeMap::new(),
            fetched: HashMap::new(),
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn slot_width(&self) -> usize {
        self.slot_width
    }

    /// Page key and slot holding record `index`.
    pub fn locate(&self, index: u64) -> (BucketKey, usize) {
        let size = self.page_size as u64;
        // remainder is below page_size, so it fits
        (pack_index(index / size), (index % size) as usize)
    }

    /// Stages record `index = value`, replacing any earlier staged value.
    ///
    /// # Errors
    ///
    /// [`PatchError::WrongSlotLength`] when `value` is not exactly
    /// `slot_width` bytes. Nothing is staged in that case.
    pub fn set(&mut self, index: u64, value: Vec<u8>) -> Result<(), ShardError> {
        let (page, slot) = self.locate(index);
        if value.len() != self.slot_width {
            return Err(PatchError::WrongSlotLength {
                slot,
                len: value.len(),
                width: self.slot_width,
            }
            .into());
        }
        self.staged.entry(page).or_default().insert(slot, value);
        Ok(())
    }

    /// Reads record `index`, preferring staged values over stored pages.
    ///
    /// `None` when the page is missing or too short to hold the slot.
    pub fn get<S: BucketStore>(
        &mut self,
        store: &S,
        index: u64,
    ) -> Result<Option<Vec<u8>>, ShardError> {
        let (page, slot) = self.locate(index);
        if let Some(value) = self.staged.get(&page).and_then(|s| s.get(&slot)) {
            return Ok(Some(value.clone()));
        }
        let width = self.slot_width;
        let blob = self.fetch(store, &page)?;
        Ok(patch::slot(blob, slot, width).map(<[u8]>::to_vec))
    }

    /// Number of pages with staged writes.
    pub fn staged_pages(&self) -> usize {
        self.staged.len()
    }

    /// Number of staged slot writes across all pages.
    pub fn staged_slots(&self) -> usize {
        self.staged.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Drops staged writes without applying them.
    pub fn discard(&mut self) {
        self.staged.clear();
    }

    /// Forgets loaded pages, so the next read goes back to the store.
    pub fn clear_cache(&mut self) {
        self.fetched.clear();
    }

    /// Overwrites the staged slots of every touched page and returns the
    /// patched blobs, in page-key order.
    ///
    /// A missing page counts as empty, so any slot staged against it fails
    /// with [`PatchError::SlotOutOfRange`]. On error nothing is consumed.
    pub fn drain<S: BucketStore>(
        &mut self,
        store: &S,
    ) -> Result<Vec<(BucketKey, Vec<u8>)>, ShardError> {
        let mut out = Vec::with_capacity(self.staged.len());
        for (page, slots) in &self.staged {
            let patched = match self.fetched.get(page) {
                Some(cached) => patch_slots(cached, slots, self.slot_width)?,
                None => {
                    let base = self.load(store, page)?;
                    patch_slots(&base, slots, self.slot_width)?
                }
            };
            out.push((*page, patched));
        }

        let slots = self.staged_slots();
        self.staged.clear();
        let mut bytes = 0usize;
        for (page, blob) in &out {
            bytes += blob.len();
            self.fetched.insert(*page, blob.clone());
        }
        tracing::debug!(pages = out.len(), slots, bytes, "page batch drained");
        Ok(out)
    }

    fn fetch<S: BucketStore>(&mut self, store: &S, page: &BucketKey) -> Result<&[u8], ShardError> {
        if !self.fetched.contains_key(page) {
            let blob = self.load(store, page)?;
            self.fetched.insert(*page, blob);
        }
        // inserted above when missing
        Ok(self.fetched[page].as_slice())
    }

    fn load<S: BucketStore>(&self, store: &S, page: &BucketKey) -> Result<Vec<u8>, ShardError> {
        let blob = store.load(page).map_err(ShardError::store)?;
        if let Some(raw) = &blob {
            tracing::trace!(page = ?page, bytes = raw.len(), "page loaded");
        }
        Ok(blob.unwrap_or_default())
    }
}
