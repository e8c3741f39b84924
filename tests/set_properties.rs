// Property tests for IntSet and ObjectSet, model-checked against
// std::collections::HashSet.
//
// - Membership and size track the model after every insert/remove.
// - Iteration yields every key exactly once.
// - Cursor removal removes exactly the chosen keys and skips nothing, even
//   when keys are compacted out of the stash.
// - Equality and content hashes ignore insertion order and table layout.
// - Growth, shrinking and bounded clears never lose or invent keys.
use std::collections::HashSet;

use cuckoo_set::Config;
use cuckoo_set::IntSet;
use cuckoo_set::ObjectSet;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(i32),
    Remove(i32),
    Reserve(usize),
    Shrink(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // A small key range makes duplicates and removals of present keys common.
    prop_oneof![
        6 => (-64i32..64).prop_map(Op::Insert),
        3 => (-64i32..64).prop_map(Op::Remove),
        1 => (0usize..200).prop_map(Op::Reserve),
        1 => (0usize..64).prop_map(Op::Shrink),
    ]
}

fn small_set() -> IntSet<i32> {
    IntSet::with_capacity(0, 0.8).unwrap()
}

proptest! {
    #[test]
    fn prop_int_set_matches_model(ops in proptest::collection::vec(op_strategy(), 1..300)) {
        let mut set = small_set();
        let mut model = HashSet::new();

        for op in ops {
            match op {
                Op::Insert(k) => {
                    prop_assert_eq!(set.insert(k), model.insert(k));
                }
                Op::Remove(k) => {
                    prop_assert_eq!(set.remove(k), model.remove(&k));
                }
                Op::Reserve(n) => {
                    let capacity = set.capacity();
                    set.reserve(n);
                    prop_assert!(set.capacity() >= capacity);
                }
                Op::Shrink(n) => {
                    let capacity = set.capacity();
                    set.shrink_to(n);
                    prop_assert!(set.capacity() <= capacity);
                }
            }
            prop_assert_eq!(set.len(), model.len());
            prop_assert!(set.capacity().is_power_of_two());
        }

        for k in -64..64 {
            prop_assert_eq!(set.contains(k), model.contains(&k), "key {}", k);
        }
    }

    #[test]
    fn prop_object_set_matches_model(
        ops in proptest::collection::vec((any::<bool>(), 0u16..200), 1..300)
    ) {
        let mut set: ObjectSet<String> = ObjectSet::with_capacity(0, 0.8).unwrap();
        let mut model = HashSet::new();

        for (insert, k) in ops {
            let key = format!("k{k}");
            if insert {
                prop_assert_eq!(set.insert(key.clone()), model.insert(key));
            } else {
                prop_assert_eq!(set.remove(&key), model.remove(&key));
            }
            prop_assert_eq!(set.len(), model.len());
        }

        let seen: HashSet<String> = set.iter().cloned().collect();
        prop_assert_eq!(seen, model);
    }

    #[test]
    fn prop_iter_yields_each_key_once(keys in proptest::collection::vec(any::<i64>(), 0..500)) {
        let set: IntSet<i64> = keys.iter().copied().collect();
        let model: HashSet<i64> = keys.iter().copied().collect();

        let yielded: Vec<i64> = set.iter().collect();
        prop_assert_eq!(yielded.len(), set.len());
        let distinct: HashSet<i64> = yielded.iter().copied().collect();
        prop_assert_eq!(distinct.len(), yielded.len());
        prop_assert_eq!(distinct, model);
    }

    #[test]
    fn prop_cursor_removal_is_safe(
        keys in proptest::collection::hash_set(any::<u32>(), 0..400),
        modulus in 1u32..5,
    ) {
        let mut set: IntSet<u32> = keys.iter().copied().collect();
        let mut visited = Vec::new();

        let mut cursor = set.cursor();
        while cursor.has_next(&set).unwrap() {
            let key = *cursor.next(&set).unwrap();
            visited.push(key);
            if key % modulus == 0 {
                let len = set.len();
                prop_assert_eq!(cursor.remove(&mut set), Ok(key));
                prop_assert_eq!(set.len(), len - 1);
            }
        }

        let distinct: HashSet<u32> = visited.iter().copied().collect();
        prop_assert_eq!(distinct.len(), visited.len(), "a key was visited twice");
        prop_assert_eq!(&distinct, &keys);

        for &k in &keys {
            prop_assert_eq!(set.contains(k), k % modulus != 0);
        }
    }

    #[test]
    fn prop_equality_ignores_order(
        keys in proptest::collection::vec(-1000i32..1000, 0..200)
            .prop_flat_map(|keys| (Just(keys.clone()), Just(keys).prop_shuffle()))
    ) {
        let (forward, shuffled) = keys;
        let a: IntSet<i32> = forward.iter().copied().collect();
        let mut b: IntSet<i32> = IntSet::with_capacity(4096, 0.5).unwrap();
        b.extend(shuffled.iter().copied());

        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.content_hash(), b.content_hash());

        let words_a: ObjectSet<String> = forward.iter().map(|k| k.to_string()).collect();
        let words_b: ObjectSet<String> = shuffled.iter().map(|k| k.to_string()).collect();
        prop_assert_eq!(&words_a, &words_b);
        prop_assert_eq!(words_a.content_hash(), words_b.content_hash());
    }

    #[test]
    fn prop_resize_preserves_membership(
        keys in proptest::collection::hash_set(any::<u64>(), 1..1000),
        seed in any::<u64>(),
    ) {
        let config = Config::default().with_initial_capacity(1).with_seed(seed);
        let mut grown: IntSet<u64> = IntSet::with_config(config).unwrap();
        let initial = grown.capacity();
        grown.extend(keys.iter().copied());
        prop_assert!(keys.len() < 2 || grown.capacity() > initial);

        let roomy: IntSet<u64> = {
            let mut set: IntSet<u64> = IntSet::with_capacity(keys.len(), 1.0).unwrap();
            set.extend(keys.iter().copied());
            set
        };
        prop_assert_eq!(&grown, &roomy);
        for &k in &keys {
            prop_assert!(grown.contains(k));
        }

        grown.shrink_to(0);
        prop_assert_eq!(grown.len(), keys.len());
        for &k in &keys {
            prop_assert!(grown.contains(k));
        }

        grown.clear_to(8);
        prop_assert!(grown.is_empty());
        prop_assert!(grown.capacity() <= 8);
    }
}
