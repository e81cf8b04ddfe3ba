//! Property tests for the selection encoding.

use proptest::prelude::*;
use selection::{SelectionMap, decode_selection, encode_selection};

fn image_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.-]{1,24}\\.(jpg|tif|png)"
}

/// Unique names, each assigned a distinct position from a shuffled `1..=n`.
fn selection_map() -> impl Strategy<Value = SelectionMap> {
    prop::collection::btree_set(image_name(), 0..=16)
        .prop_flat_map(|names| {
            let count = names.len() as u32;
            let orders: Vec<u32> = (1..=count).collect();
            (Just(names), Just(orders).prop_shuffle())
        })
        .prop_map(|(names, orders)| {
            let mut map = SelectionMap::new();
            for (name, order) in names.into_iter().zip(orders) {
                map.insert(name, order).expect("unique by construction");
            }
            map
        })
}

proptest! {
    /// Property: decoding an encoded map yields the same mapping.
    #[test]
    fn encode_decode_round_trip(map in selection_map()) {
        let encoded = encode_selection(&map);
        let decoded = decode_selection(&encoded).expect("encoded selection decodes");
        prop_assert_eq!(&decoded, &map);
        prop_assert_eq!(decoded.max_order() as usize, map.len());
    }

    /// Property: the encoder is stable across a second round trip.
    #[test]
    fn re_encoding_is_stable(map in selection_map()) {
        let first = encode_selection(&map);
        let decoded = decode_selection(&first).expect("encoded selection decodes");
        prop_assert_eq!(encode_selection(&decoded), first);
    }

    /// Property: arbitrary input never panics the decoder.
    #[test]
    fn decoder_never_panics(input in ".{0,64}") {
        let _ = decode_selection(&input);
    }
}
