//! # Patch
//!
//! Treats a blob as an array of fixed-width slots and overwrites selected
//! slots without re-encoding the rest.
//!
//! Slot `i` of width `bl` is the byte range `[i * bl, i * bl + bl)`. The slot
//! width is supplied per call and is not stored in the blob. Bytes past the
//! last whole slot are carried over untouched.
//!
//! Both entry points are all-or-nothing: a call either applies every
//! assignment or returns an error and leaves nothing observable behind.

use std::borrow::Borrow;
use std::ops::Range;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// A replacement is not exactly one slot wide.
    #[error("slot {slot}: replacement is {len} bytes, slot width is {width}")]
    WrongSlotLength { slot: usize, len: usize, width: usize },

    /// A slot reaches past the end of the blob.
    #[error("slot {slot} (width {width}) does not fit in a {blob_len}-byte blob")]
    SlotOutOfRange {
        slot: usize,
        width: usize,
        blob_len: usize,
    },
}

impl PatchError {
    /// `true` for malformed assignments, `false` when the blob is shorter
    /// than the caller's slot layout expects.
    pub fn is_caller_bug(&self) -> bool {
        matches!(self, Self::WrongSlotLength { .. })
    }
}

/// Number of whole slots in a blob of `blob_len` bytes.
pub fn slot_count(blob_len: usize, width: usize) -> usize {
    blob_len.checked_div(width).unwrap_or(0)
}

/// Borrow slot `slot`, if it lies inside `blob`.
pub fn slot(blob: &[u8], slot: usize, width: usize) -> Option<&[u8]> {
    slot_range(slot, width, blob.len())
        .ok()
        .map(|range| &blob[range])
}

fn slot_range(slot: usize, width: usize, blob_len: usize) -> Result<Range<usize>, PatchError> {
    let out_of_range = PatchError::SlotOutOfRange {
        slot,
        width,
        blob_len,
    };
    let start = slot.checked_mul(width).ok_or(out_of_range.clone())?;
    let end = start.checked_add(width).ok_or(out_of_range.clone())?;
    if end > blob_len {
        return Err(out_of_range);
    }
    Ok(start..end)
}

fn check(
    slot: usize,
    replacement: &[u8],
    width: usize,
    blob_len: usize,
) -> Result<Range<usize>, PatchError> {
    if replacement.len() != width {
        return Err(PatchError::WrongSlotLength {
            slot,
            len: replacement.len(),
            width,
        });
    }
    slot_range(slot, width, blob_len)
}

/// Copy `blob` and overwrite the assigned slots in the copy.
///
/// `blob` is never modified. Assignments are validated and written one at a
/// time into the private copy; on the first invalid one the copy is dropped.
///
/// # Errors
///
/// - [`PatchError::WrongSlotLength`] if a replacement is not `width` bytes.
/// - [`PatchError::SlotOutOfRange`] if a slot ends past the blob.
pub fn patch_slots<I, S, R>(blob: &[u8], assignments: I, width: usize) -> Result<Vec<u8>, PatchError>
where
    I: IntoIterator<Item = (S, R)>,
    S: Borrow<usize>,
    R: AsRef<[u8]>,
{
    let mut out = blob.to_vec();
    for (slot, replacement) in assignments {
        let replacement = replacement.as_ref();
        let range = check(*slot.borrow(), replacement, width, out.len())?;
        out[range].copy_from_slice(replacement);
    }
    Ok(out)
}

/// Overwrite the assigned slots of `buf` in place.
///
/// Every assignment is validated before any byte is written, so on error
/// `buf` is unchanged. Returns the number of slots written.
pub fn patch_slots_in_place<I, S, R>(
    buf: &mut [u8],
    assignments: I,
    width: usize,
) -> Result<usize, PatchError>
where
    I: IntoIterator<Item = (S, R)>,
    S: Borrow<usize>,
    R: AsRef<[u8]>,
{
    let len = buf.len();
    let staged = assignments
        .into_iter()
        .map(|(slot, replacement)| {
            check(*slot.borrow(), replacement.as_ref(), width, len)
                .map(|range| (range, replacement))
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (range, replacement) in &staged {
        buf[range.clone()].copy_from_slice(replacement.as_ref());
    }
    Ok(staged.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use proptest::prelude::*;
    use std::collections::{BTreeMap, HashMap};

    fn blob() -> Vec<u8> {
        // four 3-byte slots and a 2-byte tail
        b"aaabbbcccdddZZ".to_vec()
    }

    // -------------------- Copying patch --------------------

    #[test]
    fn patches_selected_slots() -> Result<()> {
        let original = blob();
        let mut assigns = HashMap::new();
        assigns.insert(1usize, b"XXX".to_vec());
        assigns.insert(3usize, b"YYY".to_vec());

        let out = patch_slots(&original, &assigns, 3)?;
        assert_eq!(out, b"aaaXXXcccYYYZZ");
        assert_eq!(original, blob());
        Ok(())
    }

    #[test]
    fn no_assignments_copies_blob() -> Result<()> {
        let none: Vec<(usize, Vec<u8>)> = Vec::new();
        assert_eq!(patch_slots(&blob(), none, 3)?, blob());
        Ok(())
    }

    #[test]
    fn wrong_length_fails() {
        let original = blob();
        let err = patch_slots(&original, [(0usize, b"toolong".as_slice())], 3).unwrap_err();
        assert_eq!(
            err,
            PatchError::WrongSlotLength {
                slot: 0,
                len: 7,
                width: 3
            }
        );
        assert!(err.is_caller_bug());
        assert_eq!(original, blob());
    }

    #[test]
    fn slot_into_tail_is_out_of_range() {
        // slot 4 would be bytes 12..15, the blob is 14 bytes
        let err = patch_slots(&blob(), [(4usize, b"QQQ")], 3).unwrap_err();
        assert_eq!(
            err,
            PatchError::SlotOutOfRange {
                slot: 4,
                width: 3,
                blob_len: 14
            }
        );
        assert!(!err.is_caller_bug());
    }

    #[test]
    fn huge_slot_index_does_not_overflow() {
        let err = patch_slots(&blob(), [(usize::MAX, b"QQQ")], 3).unwrap_err();
        assert!(matches!(err, PatchError::SlotOutOfRange { .. }));
    }

    #[test]
    fn error_after_valid_assignments_returns_nothing() {
        let assigns = vec![(0usize, b"111".to_vec()), (9usize, b"999".to_vec())];
        assert!(patch_slots(&blob(), assigns, 3).is_err());
    }

    #[test]
    fn zero_width_accepts_only_empty_replacements() -> Result<()> {
        assert_eq!(patch_slots(&blob(), [(7usize, b"")], 0)?, blob());
        assert!(patch_slots(&blob(), [(0usize, b"a")], 0).is_err());
        Ok(())
    }

    // -------------------- In-place patch --------------------

    #[test]
    fn in_place_is_all_or_nothing() {
        let mut buf = blob();
        let assigns = vec![(0usize, b"111".to_vec()), (2usize, b"22".to_vec())];
        assert!(patch_slots_in_place(&mut buf, assigns, 3).is_err());
        assert_eq!(buf, blob());

        let assigns = vec![(0usize, b"111".to_vec()), (2usize, b"222".to_vec())];
        assert_eq!(patch_slots_in_place(&mut buf, assigns, 3).unwrap(), 2);
        assert_eq!(buf, b"111bbb222dddZZ");
    }

    // -------------------- Slot helpers --------------------

    #[test]
    fn slot_accessors() {
        let b = blob();
        assert_eq!(slot_count(b.len(), 3), 4);
        assert_eq!(slot_count(b.len(), 0), 0);
        assert_eq!(slot(&b, 2, 3), Some(&b"ccc"[..]));
        assert_eq!(slot(&b, 4, 3), None);
    }

    proptest! {
        #[test]
        fn prop_disjoint_slots_commute(
            width in 1usize..16,
            slots in 1usize..32,
            picks in prop::collection::btree_map(0usize..32, any::<u8>(), 0..16),
        ) {
            let original: Vec<u8> = (0..width * slots + 3).map(|i| i as u8).collect();
            let assigns: BTreeMap<usize, Vec<u8>> = picks
                .into_iter()
                .filter(|(s, _)| *s < slots)
                .map(|(s, fill)| (s, vec![fill; width]))
                .collect();

            let forward = patch_slots(&original, &assigns, width).unwrap();
            let backward = patch_slots(&original, assigns.iter().rev(), width).unwrap();
            prop_assert_eq!(&forward, &backward);
            prop_assert_eq!(forward.len(), original.len());

            for (s, fill) in &assigns {
                prop_assert_eq!(slot(&forward, *s, width).unwrap(), fill.as_slice());
            }
            prop_assert_eq!(&forward[width * slots..], &original[width * slots..]);
        }
    }
}
