use std::collections::BTreeSet;

use proptest::prelude::*;

use crate::*;

/// Strategy: key sets that land on either side of the threshold, including long runs.
fn arb_keys() -> impl Strategy<Value = BTreeSet<u16>> {
    prop_oneof![
        proptest::collection::btree_set(any::<u16>(), 0..64),
        proptest::collection::btree_set(any::<u16>(), 3500..5000),
        (any::<u16>(), 0u16..12000).prop_map(|(first, span)| (first ..= first.saturating_add(span)).collect()),
    ]
}

/// Strategy: an inclusive range `(first, last)`.
fn arb_range() -> impl Strategy<Value = (u16, u16)> {
    (any::<u16>(), any::<u16>()).prop_map(|(a, b)| (a.min(b), a.max(b)))
}

/// The same keys, once in each representation, whatever their number.
fn both_forms(keys: &BTreeSet<u16>) -> [Container; 2] {
    let sparse: Sparse = keys.iter().copied().collect();
    let dense = sparse.to_bitmap();
    [Container::Sparse(sparse), Container::Dense(dense)]
}

fn model(container: &Container) -> BTreeSet<u16> {
    container.iter().collect()
}

/// Checks a result against the expected keys, and that its form follows its cardinality.
fn check(result: &Container, expected: &BTreeSet<u16>) -> std::result::Result<(), TestCaseError> {
    prop_assert_eq!(result.len(), expected.len());
    prop_assert_eq!(&model(result), expected);
    prop_assert_eq!(result.is_dense(), result.len() > DEFAULT_MAX_SIZE);
    Ok(())
}

// ===== Set algebra =====

proptest! {
    #[test]
    fn algebra_matches_model(a in arb_keys(), b in arb_keys()) {
        let and: BTreeSet<u16> = a.intersection(&b).copied().collect();
        let or: BTreeSet<u16> = a.union(&b).copied().collect();
        let xor: BTreeSet<u16> = a.symmetric_difference(&b).copied().collect();
        let and_not: BTreeSet<u16> = a.difference(&b).copied().collect();

        for x in both_forms(&a).iter() {
            for y in both_forms(&b).iter() {
                check(&x.and(y), &and)?;
                check(&x.or(y), &or)?;
                check(&x.xor(y), &xor)?;
                check(&x.and_not(y), &and_not)?;
            }
        }
    }

    #[test]
    fn in_place_matches_borrowing(a in arb_keys(), b in arb_keys()) {
        for x in both_forms(&a).iter() {
            for y in both_forms(&b).iter() {
                prop_assert_eq!(x.clone().into_and(y), x.and(y));
                prop_assert_eq!(x.clone().into_or(y), x.or(y));
                prop_assert_eq!(x.clone().into_xor(y), x.xor(y));
                prop_assert_eq!(x.clone().into_and_not(y), x.and_not(y));
            }
        }
    }

    #[test]
    fn cardinality_is_popcount(a in arb_keys(), b in arb_keys()) {
        let [_, Container::Dense(x)] = both_forms(&a) else { unreachable!() };
        let [_, Container::Dense(y)] = both_forms(&b) else { unreachable!() };
        let popcount = |op: fn(u64, u64) -> u64| -> usize {
            x.words().iter().zip(y.words().iter()).map(|(&p, &q)| op(p, q).count_ones() as usize).sum()
        };
        prop_assert_eq!(x.and_bitmap(&y).len(), popcount(|p, q| p & q));
        prop_assert_eq!(x.or_bitmap(&y).len(), popcount(|p, q| p | q));
        prop_assert_eq!(x.xor_bitmap(&y).len(), popcount(|p, q| p ^ q));
        prop_assert_eq!(x.and_not_bitmap(&y).len(), popcount(|p, q| p & !q));
    }
}

// ===== Range complement =====

proptest! {
    #[test]
    fn not_matches_model(a in arb_keys(), (first, last) in arb_range()) {
        let expected: BTreeSet<u16> = (0 ..= u16::MAX)
            .filter(|key| a.contains(key) != (first ..= last).contains(key))
            .collect();
        for x in both_forms(&a).iter() {
            check(&x.not(first, last), &expected)?;
            check(&x.clone().into_not(first, last), &expected)?;
        }
    }

    #[test]
    fn not_is_an_involution(a in arb_keys(), (first, last) in arb_range()) {
        for x in both_forms(&a).iter() {
            prop_assert_eq!(&x.not(first, last).not(first, last), x);
            prop_assert_eq!(x.not(0, u16::MAX).len(), MAX_CAPACITY - x.len());
        }
    }
}

// ===== Mutation and serialization =====

proptest! {
    #[test]
    fn inserts_and_removes_match_model(
        start in arb_keys(),
        ops in proptest::collection::vec((any::<bool>(), any::<u16>()), 0..200),
    ) {
        for mut container in both_forms(&start) {
            let mut expected = start.clone();
            for &(insert, key) in ops.iter() {
                if insert {
                    prop_assert_eq!(container.insert(key), expected.insert(key));
                } else {
                    prop_assert_eq!(container.remove(key), expected.remove(&key));
                }
                prop_assert_eq!(container.len(), expected.len());
            }
            prop_assert_eq!(model(&container), expected);
        }
    }

    #[test]
    fn serialization_round_trips(a in arb_keys(), b in arb_keys()) {
        // Both forms of each set, written back to back into one stream.
        let containers: Vec<Container> = both_forms(&a).into_iter().chain(both_forms(&b)).collect();
        let mut bytes = Vec::new();
        for container in containers.iter() {
            container.serialize(&mut bytes).unwrap();
        }
        prop_assert_eq!(bytes.len(), containers.iter().map(|c| c.serialized_size()).sum::<usize>());

        let mut reader = &bytes[..];
        for container in containers.iter() {
            let decoded = Container::deserialize(&mut reader, container.len()).unwrap();
            prop_assert_eq!(&decoded, container);
            prop_assert_eq!(decoded.is_dense(), decoded.len() > DEFAULT_MAX_SIZE);
        }
        prop_assert!(reader.is_empty());

        let bitmap = containers[1].to_bitmap();
        let mut bytes = Vec::new();
        bitmap.serialize(&mut bytes).unwrap();
        prop_assert_eq!(bytes.len(), BITMAP_BYTES);
        prop_assert_eq!(Bitmap::deserialize(&bytes[..]).unwrap(), bitmap);
    }
}
