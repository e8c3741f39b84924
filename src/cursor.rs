use rand::Rng;

use crate::error::SetError;
use crate::hash_table::HashTable;
use crate::key::KeyKind;

/// Identifies one hand-out of a pooled cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Lease {
    slot: usize,
    serial: u64,
}

/// The two pooled cursors of a set. Handing one out invalidates the other.
#[derive(Clone, Debug, Default)]
pub(crate) struct CursorPool {
    serials: [u64; 2],
    valid: [bool; 2],
}

impl CursorPool {
    pub(crate) fn lease(&mut self) -> Lease {
        let slot = usize::from(self.valid[0]);
        self.serials[slot] += 1;
        self.valid[slot] = true;
        self.valid[1 - slot] = false;
        Lease {
            slot,
            serial: self.serials[slot],
        }
    }

    pub(crate) fn is_current(&self, lease: Lease) -> bool {
        self.valid[lease.slot] && self.serials[lease.slot] == lease.serial
    }
}

/// Anything a [`Cursor`] can walk: the sets and the bare table.
pub trait CursorTarget {
    /// How the target stores its keys.
    type Kind: KeyKind;
    /// The target's displacement RNG.
    type Rng: Rng;

    /// The table holding the keys.
    fn table(&self) -> &HashTable<Self::Kind, Self::Rng>;

    /// The table holding the keys, mutably.
    fn table_mut(&mut self) -> &mut HashTable<Self::Kind, Self::Rng>;
}

impl<K: KeyKind, R: Rng> CursorTarget for HashTable<K, R> {
    type Kind = K;
    type Rng = R;

    fn table(&self) -> &HashTable<K, R> {
        self
    }

    fn table_mut(&mut self) -> &mut HashTable<K, R> {
        self
    }
}

type KeyOf<T> = <<T as CursorTarget>::Kind as KeyKind>::Key;

/// A detached position in a set that supports removal while iterating.
///
/// A cursor does not borrow the set; every step takes the set as an argument
/// and checks that the cursor is still valid for it. The scan order is the
/// reserved key (zero, for integer sets) first, then the primary slots, then
/// the stash.
///
/// A cursor becomes unusable when the set reallocates its storage (any
/// insert may do so), and, for pooled cursors, when the set hands out
/// another pooled cursor. Both are reported instead of yielding stale keys.
///
/// # Examples
///
/// ```rust
/// use cuckoo_set::IntSet;
///
/// let mut set: IntSet<i32> = (1..=5).collect();
/// let mut cursor = set.cursor();
/// while cursor.has_next(&set).unwrap() {
///     if *cursor.next(&set).unwrap() % 2 == 0 {
///         cursor.remove(&mut set).unwrap();
///     }
/// }
/// assert_eq!(set.len(), 3);
/// assert!(!set.contains(2) && !set.contains(4));
/// ```
#[derive(Debug)]
pub struct Cursor {
    /// First position not yet examined. After `has_next` it rests on the
    /// next live key, or past the end.
    position: usize,
    /// Position of the key last returned by `next`, until it is removed.
    current: Option<usize>,
    generation: u64,
    lease: Option<Lease>,
}

impl Cursor {
    pub(crate) fn new(generation: u64, lease: Option<Lease>) -> Self {
        Self {
            position: 0,
            current: None,
            generation,
            lease,
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn lease(&self) -> Option<Lease> {
        self.lease
    }

    /// Skips empty positions and returns the next live one.
    fn advance<K: KeyKind, R: Rng>(&mut self, table: &HashTable<K, R>) -> Option<usize> {
        let next = table.next_live(self.position);
        self.position = next.unwrap_or_else(|| table.end_position());
        next
    }

    /// Returns `true` while a key remains ahead of the cursor.
    ///
    /// The position found is kept, so repeated calls do not rescan.
    pub fn has_next<T: CursorTarget>(&mut self, target: &T) -> Result<bool, SetError> {
        let table = target.table();
        table.check_cursor(self)?;
        Ok(self.advance(table).is_some())
    }

    /// Returns the next key and moves past it.
    ///
    /// Fails with [`SetError::Exhausted`] when no key remains.
    pub fn next<'a, T: CursorTarget>(&mut self, target: &'a T) -> Result<&'a KeyOf<T>, SetError> {
        let table = target.table();
        table.check_cursor(self)?;
        let position = self.advance(table).ok_or(SetError::Exhausted)?;
        self.current = Some(position);
        self.position = position + 1;
        table.key_at(position).ok_or(SetError::Exhausted)
    }

    /// Removes the key last returned by [`next`](Cursor::next) and returns
    /// it.
    ///
    /// Fails with [`SetError::RemoveWithoutNext`] if `next` has not been
    /// called since the last removal. A key removed from the stash is
    /// replaced by the last stash entry; the cursor steps back so that entry
    /// is still visited.
    pub fn remove<T: CursorTarget>(&mut self, target: &mut T) -> Result<KeyOf<T>, SetError> {
        let table = target.table_mut();
        table.check_cursor(self)?;
        let position = self.current.take().ok_or(SetError::RemoveWithoutNext)?;
        let (key, compacted) = table
            .remove_at(position)
            .ok_or(SetError::RemoveWithoutNext)?;
        if compacted {
            self.position = position;
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::config::IterationPolicy;
    use crate::hash_table::tests::colliding_keys;
    use crate::key::IntKeys;

    type IntTable = HashTable<IntKeys<u32>>;

    fn identity(key: &u32) -> u32 {
        *key
    }

    fn table_with(keys: impl IntoIterator<Item = u32>) -> IntTable {
        let mut table = IntTable::with_config(Config::default()).unwrap();
        for k in keys {
            table.insert(k, identity);
        }
        table
    }

    fn drain_with_cursor(table: &mut IntTable) -> Vec<u32> {
        let mut cursor = table.fresh_cursor();
        let mut seen = Vec::new();
        while cursor.has_next(&*table).unwrap() {
            seen.push(*cursor.next(&*table).unwrap());
            seen.push(cursor.remove(table).unwrap());
        }
        seen
    }

    #[test]
    fn pool_alternates_slots() {
        let mut pool = CursorPool::default();
        let first = pool.lease();
        assert!(pool.is_current(first));

        let second = pool.lease();
        assert_ne!(first.slot, second.slot);
        assert!(!pool.is_current(first));
        assert!(pool.is_current(second));

        let third = pool.lease();
        assert_eq!(third.slot, first.slot);
        assert!(!pool.is_current(first), "old lease revived");
        assert!(!pool.is_current(second));
        assert!(pool.is_current(third));
    }

    #[test]
    fn visits_every_key_once() {
        let table = table_with((0..200u32).map(|k| k * 7));
        let mut cursor = table.fresh_cursor();
        let mut seen = Vec::new();
        while cursor.has_next(&table).unwrap() {
            seen.push(*cursor.next(&table).unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..200u32).map(|k| k * 7).collect::<Vec<_>>());
        assert_eq!(cursor.next(&table), Err(SetError::Exhausted));
    }

    #[test]
    fn remove_current_during_iteration() {
        let mut table = table_with(1..=5);
        let mut cursor = table.cursor();
        while cursor.has_next(&table).unwrap() {
            if *cursor.next(&table).unwrap() == 3 {
                assert_eq!(cursor.remove(&mut table), Ok(3));
            }
        }
        assert_eq!(table.len(), 4);
        assert!(!table.contains(&3, 3));
        for k in [1, 2, 4, 5] {
            assert!(table.contains(&k, k));
        }
    }

    #[test]
    fn remove_requires_next() {
        let mut table = table_with(1..=3);
        let mut cursor = table.cursor();
        assert_eq!(cursor.remove(&mut table), Err(SetError::RemoveWithoutNext));

        cursor.next(&table).unwrap();
        assert!(cursor.remove(&mut table).is_ok());
        assert_eq!(cursor.remove(&mut table), Err(SetError::RemoveWithoutNext));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn removes_the_zero_sentinel() {
        let mut table = table_with([0, 1, 2]);
        let mut cursor = table.cursor();
        assert_eq!(cursor.next(&table), Ok(&0));
        assert_eq!(cursor.remove(&mut table), Ok(0));
        assert!(!table.contains(&0, 0));
        assert_eq!(table.len(), 2);

        let mut rest = Vec::new();
        while cursor.has_next(&table).unwrap() {
            rest.push(*cursor.next(&table).unwrap());
        }
        rest.sort_unstable();
        assert_eq!(rest, [1, 2]);
    }

    #[test]
    fn stash_removal_does_not_skip() {
        let keys = colliding_keys(64, 3 + 6);
        let mut table = table_with(keys.iter().copied());
        assert_eq!(table.debug_stats().stash_len, 6);

        let mut removed = drain_with_cursor(&mut table);
        assert!(table.is_empty());
        table.debug_stats().assert_consistent();

        // Each key appears twice: once from next, once from remove.
        removed.sort_unstable();
        removed.dedup();
        let mut expected = keys.clone();
        expected.sort_unstable();
        assert_eq!(removed, expected);
    }

    #[test]
    fn has_next_keeps_its_position() {
        let mut table = table_with([3, 9, 27]);
        let mut cursor = table.fresh_cursor();

        assert!(cursor.has_next(&table).unwrap());
        let ahead = cursor.position;
        assert!(table.key_at(ahead).is_some());
        assert!(cursor.has_next(&table).unwrap());
        assert_eq!(cursor.position, ahead);

        // The key found ahead disappears before next; the scan moves on.
        let gone = *table.key_at(ahead).unwrap();
        assert_eq!(table.remove(&gone, gone), Some(gone));
        let mut rest = Vec::new();
        while cursor.has_next(&table).unwrap() {
            rest.push(*cursor.next(&table).unwrap());
        }
        rest.sort_unstable();
        let mut expected: Vec<u32> = [3, 9, 27].into_iter().filter(|&k| k != gone).collect();
        expected.sort_unstable();
        assert_eq!(rest, expected);

        assert_eq!(cursor.position, table.end_position());
        assert!(!cursor.has_next(&table).unwrap());
        assert_eq!(cursor.position, table.end_position());
        assert_eq!(cursor.next(&table), Err(SetError::Exhausted));
    }

    #[test]
    fn nested_pooled_cursor_is_reported() {
        let mut table = table_with(1..=4);
        let mut outer = table.cursor();
        outer.next(&table).unwrap();

        let mut inner = table.cursor();
        while inner.has_next(&table).unwrap() {
            inner.next(&table).unwrap();
        }
        assert_eq!(outer.has_next(&table), Err(SetError::CursorNested));
        assert_eq!(outer.next(&table), Err(SetError::CursorNested));
        assert_eq!(outer.remove(&mut table), Err(SetError::CursorNested));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn fresh_cursors_coexist() {
        let table = table_with(1..=4);
        let mut outer = table.fresh_cursor();
        let mut pairs = 0;
        while outer.has_next(&table).unwrap() {
            outer.next(&table).unwrap();
            let mut inner = table.fresh_cursor();
            while inner.has_next(&table).unwrap() {
                inner.next(&table).unwrap();
                pairs += 1;
            }
        }
        assert_eq!(pairs, 16);
    }

    #[test]
    fn fresh_policy_bypasses_pool() {
        let config = Config::default().with_iteration(IterationPolicy::Fresh);
        let mut table = IntTable::with_config(config).unwrap();
        table.insert(1, identity);

        let mut outer = table.cursor();
        let _inner = table.cursor();
        assert_eq!(outer.next(&table), Ok(&1));
    }

    #[test]
    fn resize_invalidates_cursor() {
        let config = Config::default().with_initial_capacity(2);
        let mut table = IntTable::with_config(config).unwrap();
        table.insert(1, identity);

        let mut cursor = table.fresh_cursor();
        let capacity = table.capacity();
        for k in 2..100 {
            table.insert(k, identity);
        }
        assert!(table.capacity() > capacity);
        assert_eq!(cursor.has_next(&table), Err(SetError::CursorInvalidated));
        assert_eq!(cursor.next(&table), Err(SetError::CursorInvalidated));
        assert_eq!(
            cursor.remove(&mut table),
            Err(SetError::CursorInvalidated)
        );
    }
}
