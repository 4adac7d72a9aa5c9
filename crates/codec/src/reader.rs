//! Map decoding.

use crate::cursor::ByteCursor;
use crate::entry::{ByteMap, EntrySink};
use crate::error::CodecError;
use crate::format::Encoding;

/// Zero-copy iterator over the records of an encoded buffer.
///
/// Yields borrowed `(key, value)` slices. The first malformed record yields an
/// error and ends iteration. Bytes after the last declared record are not
/// inspected.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    cursor: ByteCursor<'a>,
    encoding: Encoding,
    declared: u64,
    left: u64,
}

impl<'a> Records<'a> {
    /// Read the count header and position the iterator on the first record.
    pub fn new(buf: &'a [u8], encoding: Encoding) -> Result<Self, CodecError> {
        let mut cursor = ByteCursor::new(buf);
        let declared = cursor.read_count(encoding)?;
        Ok(Self {
            cursor,
            encoding,
            declared,
            left: declared,
        })
    }

    /// Record count from the buffer header.
    pub fn declared_count(&self) -> u64 {
        self.declared
    }

    /// How many records could still fit in the unread bytes.
    ///
    /// A corrupt header may declare far more records than the buffer holds;
    /// this bound keeps pre-allocation proportional to the input size.
    pub fn capacity_hint(&self) -> usize {
        let fit = self.cursor.remaining() / self.encoding.min_record_len();
        usize::try_from(self.left).map_or(fit, |left| left.min(fit))
    }

    fn read_record(&mut self) -> Result<(&'a [u8], &'a [u8]), CodecError> {
        let key = self.cursor.read_field(self.encoding)?;
        let value = self.cursor.read_field(self.encoding)?;
        Ok((key, value))
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<(&'a [u8], &'a [u8]), CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.left == 0 {
            return None;
        }
        match self.read_record() {
            Ok(record) => {
                self.left -= 1;
                Some(Ok(record))
            }
            Err(e) => {
                self.left = 0;
                Some(Err(e))
            }
        }
    }
}

/// Decode a buffer into a fresh [`ByteMap`].
///
/// # Errors
///
/// [`CodecError::TruncatedBuffer`] if any count, length, or field runs past the
/// end of `buf`. No partial map is returned.
pub fn decode(buf: &[u8], encoding: Encoding) -> Result<ByteMap, CodecError> {
    decode_into(buf, encoding)
}

/// Decode a buffer into any map implementing [`EntrySink`].
///
/// When a key repeats, the later record wins.
pub fn decode_into<M: EntrySink>(buf: &[u8], encoding: Encoding) -> Result<M, CodecError> {
    let records = Records::new(buf, encoding)?;
    let declared = records.declared_count();
    let mut map = M::with_entry_capacity(records.capacity_hint());
    for record in records {
        let (key, value) = record?;
        map.insert_entry(key, value);
    }
    tracing::trace!(
        %encoding,
        entries = declared,
        bytes = buf.len(),
        "map decoded"
    );
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::encode;
    use anyhow::Result;
    use bytes::Bytes;
    use std::collections::{BTreeMap, HashMap};

    fn sample() -> ByteMap {
        let mut m = ByteMap::new();
        m.insert(b"apple".to_vec(), b"red".to_vec());
        m.insert(b"banana".to_vec(), b"yellow".to_vec());
        m.insert(b"".to_vec(), b"empty key".to_vec());
        m.insert(b"empty value".to_vec(), b"".to_vec());
        m.insert(vec![0x00, 0xFF, 0x80], vec![0xDE, 0xAD, 0xBE, 0xEF]);
        m
    }

    // -------------------- Round trips --------------------

    #[test]
    fn round_trip_both_encodings() -> Result<()> {
        let m = sample();
        for enc in [Encoding::Fixed, Encoding::Varint] {
            let buf = encode(&m, enc)?;
            assert_eq!(decode(&buf, enc)?, m);
        }
        Ok(())
    }

    #[test]
    fn round_trip_empty_map() -> Result<()> {
        let m = ByteMap::new();
        for enc in [Encoding::Fixed, Encoding::Varint] {
            assert!(decode(&encode(&m, enc)?, enc)?.is_empty());
        }
        Ok(())
    }

    #[test]
    fn round_trip_large_values() -> Result<()> {
        let mut m = ByteMap::new();
        m.insert(b"big".to_vec(), vec![b'x'; 500_000]);
        m.insert(vec![b'k'; 16_384], b"long key".to_vec());
        for enc in [Encoding::Fixed, Encoding::Varint] {
            assert_eq!(decode(&encode(&m, enc)?, enc)?, m);
        }
        Ok(())
    }

    #[test]
    fn decode_into_other_maps() -> Result<()> {
        let m = sample();
        let buf = encode(&m, Encoding::Varint)?;

        let sorted: BTreeMap<Vec<u8>, Vec<u8>> = decode_into(&buf, Encoding::Varint)?;
        assert_eq!(sorted.len(), m.len());
        assert_eq!(sorted.get(&b"apple"[..]), Some(&b"red".to_vec()));

        let shared: HashMap<Bytes, Bytes> = decode_into(&buf, Encoding::Varint)?;
        assert_eq!(shared[&Bytes::from_static(b"banana")], Bytes::from_static(b"yellow"));
        Ok(())
    }

    #[test]
    fn later_duplicate_wins() -> Result<()> {
        let buf = [2, 1, b'k', 1, b'1', 1, b'k', 1, b'2'];
        let m = decode(&buf, Encoding::Varint)?;
        assert_eq!(m.len(), 1);
        assert_eq!(m[&b"k".to_vec()], b"2");
        Ok(())
    }

    // -------------------- Records iterator --------------------

    #[test]
    fn records_borrow_from_buffer() -> Result<()> {
        let pairs = vec![(b"a".to_vec(), b"1".to_vec()), (b"b".to_vec(), b"22".to_vec())];
        let buf = encode(pairs.iter().map(|(k, v)| (k, v)), Encoding::Fixed)?;

        let records = Records::new(&buf, Encoding::Fixed)?;
        assert_eq!(records.declared_count(), 2);
        let got: Vec<_> = records.collect::<Result<_, _>>()?;
        assert_eq!(got, vec![(&b"a"[..], &b"1"[..]), (&b"b"[..], &b"22"[..])]);
        Ok(())
    }

    #[test]
    fn records_stop_after_first_error() {
        // declares 3 records, holds 1
        let buf = [3, 1, b'a', 1, b'b'];
        let mut records = Records::new(&buf, Encoding::Varint).unwrap();
        assert!(records.next().unwrap().is_ok());
        assert!(records.next().unwrap().is_err());
        assert!(records.next().is_none());
    }

    // -------------------- Truncation --------------------

    #[test]
    fn key_length_past_end_is_truncated() {
        let mut buf = vec![1, 0, 0, 0, 0, 0, 0, 0];
        buf.extend_from_slice(&100u32.to_le_bytes());
        buf.extend_from_slice(b"short");

        let err = decode(&buf, Encoding::Fixed).unwrap_err();
        assert_eq!(
            err,
            CodecError::TruncatedBuffer {
                offset: 12,
                needed: 100,
                remaining: 5
            }
        );
        assert!(!err.is_caller_bug());
    }

    #[test]
    fn every_proper_prefix_is_truncated() -> Result<()> {
        let m = sample();
        for enc in [Encoding::Fixed, Encoding::Varint] {
            let buf = encode(&m, enc)?;
            for cut in 0..buf.len() {
                let err = decode(&buf[..cut], enc).unwrap_err();
                assert!(
                    matches!(err, CodecError::TruncatedBuffer { .. }),
                    "{enc} cut at {cut}: {err}"
                );
            }
        }
        Ok(())
    }

    #[test]
    fn inflated_count_is_truncated_not_allocated() {
        let mut buf = u64::MAX.to_le_bytes().to_vec();
        buf.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0]);

        let records = Records::new(&buf, Encoding::Fixed).unwrap();
        assert_eq!(records.capacity_hint(), 1);
        assert!(matches!(
            decode(&buf, Encoding::Fixed),
            Err(CodecError::TruncatedBuffer { .. })
        ));
    }

    #[test]
    fn trailing_bytes_are_ignored() -> Result<()> {
        let m = sample();
        let mut buf = encode(&m, Encoding::Varint)?;
        buf.extend_from_slice(b"trailer");
        assert_eq!(decode(&buf, Encoding::Varint)?, m);
        Ok(())
    }
}
