use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

fn map_strategy() -> impl Strategy<Value = BTreeMap<Vec<u8>, Vec<u8>>> {
    let key = prop::collection::vec(any::<u8>(), 0..40);
    let value = prop_oneof![
        8 => prop::collection::vec(any::<u8>(), 0..64),
        // crosses the one/two/three byte varint boundaries
        1 => prop::collection::vec(any::<u8>(), 120..20_000),
    ];
    prop::collection::btree_map(key, value, 0..64)
}

fn encoding_strategy() -> impl Strategy<Value = Encoding> {
    prop_oneof![Just(Encoding::Fixed), Just(Encoding::Varint)]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_round_trip(m in map_strategy(), enc in encoding_strategy()) {
        let buf = encode(&m, enc).unwrap();
        prop_assert_eq!(buf.len(), encoded_len(&m, enc).unwrap());
        let back: BTreeMap<Vec<u8>, Vec<u8>> = decode_into(&buf, enc).unwrap();
        prop_assert_eq!(back, m);
    }

    #[test]
    fn prop_encode_is_deterministic(m in map_strategy(), enc in encoding_strategy()) {
        prop_assert_eq!(encode(&m, enc).unwrap(), encode(&m, enc).unwrap());
    }

    #[test]
    fn prop_every_prefix_is_truncated(m in map_strategy(), enc in encoding_strategy(), cut in any::<prop::sample::Index>()) {
        let buf = encode(&m, enc).unwrap();
        let cut = cut.index(buf.len().max(1));
        if cut < buf.len() {
            let truncated = matches!(decode(&buf[..cut], enc), Err(CodecError::TruncatedBuffer { .. }));
            prop_assert!(truncated);
        }
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(buf in prop::collection::vec(any::<u8>(), 0..256), enc in encoding_strategy()) {
        let _ = decode(&buf, enc);
    }

    #[test]
    fn prop_varint_round_trip(v in any::<u64>()) {
        let mut buf = Vec::new();
        varint::encode(v, &mut buf);
        prop_assert_eq!(buf.len(), varint::encoded_len(v));
        let mut pos = 0;
        prop_assert_eq!(varint::decode(&buf, &mut pos).unwrap(), v);
    }
}
