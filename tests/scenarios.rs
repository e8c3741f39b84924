// End-to-end scenarios through the public API only.
use cuckoo_set::Config;
use cuckoo_set::IntSet;
use cuckoo_set::ObjectSet;
use cuckoo_set::SetError;

/// Candidate slots of `hash` in a table of `capacity` primary slots,
/// mirroring the table's probe functions.
fn probes(hash: u32, capacity: usize) -> [usize; 3] {
    let mask = capacity - 1;
    let shift = 31 - capacity.trailing_zeros();
    let fold = |h: u32| (h ^ (h >> shift)) as usize & mask;
    [
        hash as usize & mask,
        fold(hash.wrapping_mul(0xb4b8_2e39)),
        fold(hash.wrapping_mul(0xced1_c241)),
    ]
}

#[test]
fn add_hundred_and_remove_one() {
    let mut set: IntSet<i32> = IntSet::with_capacity(16, 0.8).unwrap();
    for k in 0..=100 {
        set.insert(k);
    }
    assert_eq!(set.len(), 101);
    assert!(set.contains(50));

    assert!(set.remove(50));
    assert_eq!(set.len(), 100);
    assert!(!set.contains(50));
}

#[test]
fn duplicate_add_is_rejected() {
    let mut set: IntSet<i32> = IntSet::new();
    assert!(set.insert(5));
    assert!(!set.insert(5));
    assert_eq!(set.len(), 1);
}

#[test]
fn adversarial_keys_force_growth() {
    let mut set: IntSet<u32> = IntSet::new();
    let capacity = set.capacity();
    assert_eq!(capacity, 64);

    // 64 primary slots get a stash of ceil(ln 64) * 2 = 10.
    let stash_capacity = 10;
    let target = probes(1, capacity);
    let keys: Vec<u32> = (1..u32::MAX)
        .filter(|&k| probes(k, capacity) == target)
        .take(3 + stash_capacity + 1)
        .collect();

    for &k in &keys {
        assert!(set.insert(k));
    }
    assert!(set.capacity() > capacity);
    for &k in &keys {
        assert!(set.contains(k), "lost {k}");
    }
}

#[test]
fn equality_ignores_insertion_order() {
    let mut a: IntSet<i32> = IntSet::new();
    for k in [3, 1, 4, 1, 5, 9] {
        a.insert(k);
    }
    let mut b: IntSet<i32> = IntSet::new();
    for k in [9, 5, 4, 3, 1] {
        b.insert(k);
    }
    assert_eq!(a, b);
    assert_eq!(a.content_hash(), b.content_hash());
}

#[test]
fn remove_through_cursor() {
    let mut set: IntSet<i32> = IntSet::new();
    set.extend([1, 2, 3, 4, 5]);

    let mut cursor = set.cursor();
    while cursor.has_next(&set).unwrap() {
        if *cursor.next(&set).unwrap() == 3 {
            cursor.remove(&mut set).unwrap();
        }
    }
    assert_eq!(set.len(), 4);
    assert!(!set.contains(3));
    for k in [1, 2, 4, 5] {
        assert!(set.contains(k));
    }
}

#[test]
fn shrink_to_smallest_fitting_power_of_two() {
    let mut set: IntSet<i32> = IntSet::new();
    set.extend(1..=10);
    set.shrink_to(0);
    assert_eq!(set.capacity(), 16);
    for k in 1..=10 {
        assert!(set.contains(k));
    }
}

#[test]
fn invalid_arguments_are_rejected() {
    assert!(matches!(
        IntSet::<i32>::with_capacity(10, 0.0),
        Err(SetError::InvalidLoadFactor(_))
    ));
    assert!(matches!(
        IntSet::<i32>::with_config(Config::default().with_initial_capacity(1 << 31)),
        Err(SetError::CapacityOverflow { .. })
    ));
    assert_eq!(IntSet::<i32>::new().first(), Err(SetError::Empty));

    let mut set: ObjectSet<u8> = ObjectSet::new();
    assert!(matches!(
        set.try_reserve(usize::MAX),
        Err(SetError::CapacityOverflow { .. })
    ));
    assert!(set.is_empty());
}

#[test]
fn nested_pooled_cursors_are_reported() {
    let mut set: IntSet<i32> = (1..=3).collect();
    let mut outer = set.cursor();
    outer.next(&set).unwrap();

    let mut inner = set.cursor();
    inner.next(&set).unwrap();
    assert_eq!(outer.next(&set), Err(SetError::CursorNested));

    let mut fresh = set.fresh_cursor();
    assert!(fresh.next(&set).is_ok());
    assert!(inner.next(&set).is_ok());
}

#[test]
fn insert_invalidates_cursor_on_resize() {
    let mut set: IntSet<i32> = IntSet::with_capacity(1, 0.8).unwrap();
    set.insert(1);
    let mut cursor = set.fresh_cursor();
    set.extend(2..100);
    assert_eq!(cursor.next(&set), Err(SetError::CursorInvalidated));
}
