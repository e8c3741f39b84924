use core::alloc::Layout;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Display;
use core::iter::FusedIterator;
use core::ops::Range;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::config::IterationPolicy;
use crate::config::capacity_for;
use crate::cursor::Cursor;
use crate::cursor::CursorPool;
use crate::error::SetError;
use crate::error::infallible;
use crate::key::Indices;
use crate::key::KeyKind;

/// Largest number of primary slots a table may have.
pub const MAX_CAPACITY: usize = 1 << 30;

/// Multipliers decorrelating the second and third candidate slot from the
/// first. Both odd, so multiplication is a bijection on `u32`.
const PRIME2: u32 = 0xb4b8_2e39;
const PRIME3: u32 = 0xced1_c241;

/// The same multipliers sign-extended to 64 bits.
const WIDE_PRIME2: u64 = PRIME2 as i32 as i64 as u64;
const WIDE_PRIME3: u64 = PRIME3 as i32 as i64 as u64;

/// A hash value the table can derive candidate slots from.
///
/// The first slot is the low bits of the hash. The other two multiply the
/// hash by a fixed odd constant and fold its high bits down onto the mask,
/// over the full width of the hash. A 64-bit key therefore probes with all
/// of its bits instead of a 32-bit digest.
pub trait ProbeHash: Copy {
    /// Returns the three candidate slots in a table whose primary region is
    /// `mask + 1` slots. `shift` is `31 - log2(mask + 1)`, the fold for
    /// 32-bit hashes.
    fn probes(self, mask: usize, shift: u32) -> [usize; 3];
}

impl ProbeHash for u32 {
    #[inline(always)]
    fn probes(self, mask: usize, shift: u32) -> [usize; 3] {
        let fold = |h: u32| (h ^ (h >> shift)) as usize & mask;
        [
            self as usize & mask,
            fold(self.wrapping_mul(PRIME2)),
            fold(self.wrapping_mul(PRIME3)),
        ]
    }
}

impl ProbeHash for u64 {
    #[inline(always)]
    fn probes(self, mask: usize, shift: u32) -> [usize; 3] {
        let shift = shift + 32;
        let fold = |h: u64| (h ^ (h >> shift)) as usize & mask;
        [
            self as usize & mask,
            fold(self.wrapping_mul(WIDE_PRIME2)),
            fold(self.wrapping_mul(WIDE_PRIME3)),
        ]
    }
}

fn alloc_error<T>(len: usize) -> SetError {
    match Layout::array::<T>(len) {
        Ok(layout) => SetError::AllocationFailed { layout },
        Err(_) => SetError::CapacityOverflow {
            requested: len,
            max: MAX_CAPACITY,
        },
    }
}

/// Everything derived from the primary capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Geometry {
    capacity: usize,
    mask: usize,
    hash_shift: u32,
    threshold: usize,
    stash_capacity: usize,
    push_iterations: usize,
}

impl Geometry {
    fn new(capacity: usize, load_factor: f32) -> Result<Self, SetError> {
        if capacity > MAX_CAPACITY {
            return Err(SetError::CapacityOverflow {
                requested: capacity,
                max: MAX_CAPACITY,
            });
        }
        debug_assert!(capacity.is_power_of_two());

        Ok(Self {
            capacity,
            mask: capacity - 1,
            hash_shift: 31 - capacity.trailing_zeros(),
            threshold: (capacity as f32 * load_factor) as usize,
            stash_capacity: ((capacity as f64).ln().ceil() as usize * 2).max(3),
            push_iterations: capacity.min(8).max((capacity as f64).sqrt() as usize / 8),
        })
    }

    #[inline(always)]
    fn slots(&self) -> usize {
        self.capacity + self.stash_capacity
    }

    /// The three candidate slots for `hash`. They may coincide in small
    /// tables.
    #[inline(always)]
    fn probes<H: ProbeHash>(&self, hash: H) -> [usize; 3] {
        hash.probes(self.mask, self.hash_shift)
    }
}

/// The flat slot array: `capacity` probed slots followed by a dense stash.
struct Storage<K: KeyKind> {
    slots: Vec<K::Slot>,
    geometry: Geometry,
    stash_len: usize,
    /// Victim slots of the current displacement chain, reused across inserts.
    trail: Vec<usize>,
}

impl<K: KeyKind> Clone for Storage<K>
where
    K::Slot: Clone,
{
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            geometry: self.geometry,
            stash_len: self.stash_len,
            trail: Vec::new(),
        }
    }
}

impl<K: KeyKind> Storage<K> {
    fn try_new(geometry: Geometry) -> Result<Self, SetError> {
        let len = geometry.slots();
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(len)
            .map_err(|_| alloc_error::<K::Slot>(len))?;
        slots.resize_with(len, K::empty);

        Ok(Self {
            slots,
            geometry,
            stash_len: 0,
            trail: Vec::new(),
        })
    }

    #[inline(always)]
    fn stash(&self) -> Range<usize> {
        self.geometry.capacity..self.geometry.capacity + self.stash_len
    }

    #[inline(always)]
    fn is_vacant(&self, index: usize) -> bool {
        K::get(&self.slots[index]).is_none()
    }

    fn find(&self, key: &K::Key, hash: K::Hash) -> Option<usize>
    where
        K::Key: Eq,
    {
        let holds = |index: &usize| K::get(&self.slots[*index]) == Some(key);
        self.geometry
            .probes(hash)
            .into_iter()
            .find(holds)
            .or_else(|| self.stash().find(holds))
    }

    /// Stores a key known to be absent.
    ///
    /// Tries the three candidate slots, then walks a random displacement
    /// chain of at most `push_iterations` evictions, then the stash. If the
    /// stash is full the chain is replayed backwards, the table is left
    /// exactly as it was, and the key is handed back.
    fn place<R: Rng>(
        &mut self,
        key: K::Key,
        hash: K::Hash,
        hasher: &impl Fn(&K::Key) -> K::Hash,
        rng: &mut R,
    ) -> Result<(), K::Key> {
        let mut probes = self.geometry.probes(hash);
        if let Some(index) = probes.into_iter().find(|&i| self.is_vacant(i)) {
            self.slots[index] = K::fill(key);
            return Ok(());
        }

        self.trail.clear();
        let mut key = key;
        for _ in 0..self.geometry.push_iterations {
            let victim = probes[rng.random_range(0..3)];
            let evicted = match K::replace(&mut self.slots[victim], key) {
                Some(evicted) => evicted,
                None => return Ok(()),
            };
            self.trail.push(victim);

            probes = self.geometry.probes(hasher(&evicted));
            if let Some(index) = probes.into_iter().find(|&i| self.is_vacant(i)) {
                self.slots[index] = K::fill(evicted);
                return Ok(());
            }
            key = evicted;
        }

        if self.stash_len < self.geometry.stash_capacity {
            let index = self.geometry.capacity + self.stash_len;
            self.slots[index] = K::fill(key);
            self.stash_len += 1;
            log::trace!(
                "stashed key after {} displacements ({}/{} stash slots used)",
                self.trail.len(),
                self.stash_len,
                self.geometry.stash_capacity
            );
            return Ok(());
        }

        log::trace!(
            "stash full, unwinding {} displacements",
            self.trail.len()
        );
        while let Some(victim) = self.trail.pop() {
            key = match K::replace(&mut self.slots[victim], key) {
                Some(previous) => previous,
                None => return Ok(()),
            };
        }
        Err(key)
    }

    /// Empties `index`. Stash entries are compacted by moving the last stash
    /// entry into the hole.
    fn remove_index(&mut self, index: usize) -> Option<K::Key> {
        let key = K::take(&mut self.slots[index])?;
        if index >= self.geometry.capacity {
            let last = self.geometry.capacity + self.stash_len - 1;
            self.slots.swap(index, last);
            self.stash_len -= 1;
        }
        Some(key)
    }

    fn clear(&mut self) {
        self.slots.fill_with(K::empty);
        self.stash_len = 0;
    }
}

/// Finds a placement of every entry in a table of the given geometry without
/// touching the keys themselves. Returns `None` when the stash overflows.
fn plan_placement<H: ProbeHash, R: Rng>(
    geometry: Geometry,
    entries: &[(usize, H)],
    rng: &mut R,
) -> Result<Option<Storage<Indices<H>>>, SetError> {
    let mut plan = Storage::<Indices<H>>::try_new(geometry)?;
    let hasher = |entry: &u32| entries[*entry as usize].1;
    for (entry, &(_, hash)) in entries.iter().enumerate() {
        if plan.place(entry as u32, hash, &hasher, rng).is_err() {
            return Ok(None);
        }
    }
    Ok(Some(plan))
}

/// The cuckoo hashing engine behind [`IntSet`](crate::IntSet) and
/// [`ObjectSet`](crate::ObjectSet).
///
/// Keys live in one flat array. Every key has three candidate slots derived
/// from its [`ProbeHash`]; keys that cannot be placed within a bounded random
/// walk of evictions go to a small stash at the end of the array. Keys
/// reserved by the [`KeyKind`] (zero, for integers) are tracked out of band.
///
/// The table does not hash keys itself: callers pass the hash, or a hasher
/// for operations that may relocate keys.
///
/// # Examples
///
/// ```rust
/// use cuckoo_set::Config;
/// use cuckoo_set::HashTable;
/// use cuckoo_set::key::IntKeys;
///
/// let mut table: HashTable<IntKeys<u32>> = HashTable::with_config(Config::default()).unwrap();
/// let hasher = |k: &u32| *k;
///
/// assert!(table.insert(7, hasher));
/// assert!(!table.insert(7, hasher));
/// assert!(table.contains(&7, 7));
/// assert_eq!(table.remove(&7, 7), Some(7));
/// assert!(table.is_empty());
/// ```
pub struct HashTable<K: KeyKind, R = SmallRng> {
    storage: Storage<K>,
    sentinel: Option<K::Key>,
    populated: usize,
    load_factor: f32,
    /// Largest primary capacity a rebuild may produce.
    capacity_limit: usize,
    /// Bumped whenever the slot array is reallocated.
    generation: u64,
    iteration: IterationPolicy,
    pool: CursorPool,
    rng: R,
}

impl<K: KeyKind, R> Debug for HashTable<K, R>
where
    K::Key: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let geometry = &self.storage.geometry;
        f.debug_struct("HashTable")
            .field("populated", &self.populated)
            .field("capacity", &geometry.capacity)
            .field("threshold", &geometry.threshold)
            .field(
                "stash",
                &format_args!("{}/{}", self.storage.stash_len, geometry.stash_capacity),
            )
            .field("sentinel", &self.sentinel)
            .field(
                "slots",
                &self
                    .storage
                    .slots
                    .iter()
                    .map(|slot| K::get(slot))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<K: KeyKind, R> Clone for HashTable<K, R>
where
    K::Key: Clone,
    K::Slot: Clone,
    R: Clone,
{
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            sentinel: self.sentinel.clone(),
            populated: self.populated,
            load_factor: self.load_factor,
            capacity_limit: self.capacity_limit,
            generation: self.generation,
            iteration: self.iteration,
            pool: CursorPool::default(),
            rng: self.rng.clone(),
        }
    }
}

impl<K: KeyKind, R: Rng + SeedableRng> HashTable<K, R> {
    /// Creates a table from `config`, seeding the displacement RNG with
    /// [`Config::seed`].
    pub fn with_config(config: Config) -> Result<Self, SetError> {
        Self::with_config_and_rng(config, R::seed_from_u64(config.seed()))
    }
}

impl<K: KeyKind, R: Rng> HashTable<K, R> {
    /// Creates a table from `config` that draws displacement choices from
    /// `rng`.
    pub fn with_config_and_rng(config: Config, rng: R) -> Result<Self, SetError> {
        let capacity = config.validate()?;
        let storage = Storage::try_new(Geometry::new(capacity, config.load_factor())?)?;

        Ok(Self {
            storage,
            sentinel: None,
            populated: 0,
            load_factor: config.load_factor(),
            capacity_limit: MAX_CAPACITY,
            generation: 0,
            iteration: config.iteration(),
            pool: CursorPool::default(),
            rng,
        })
    }

    /// Returns the number of keys in the table, the reserved key included.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no keys.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of primary (probed) slots. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.storage.geometry.capacity
    }

    /// Returns the load factor the table was created with.
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Returns an iterator over the keys: the reserved key first, then the
    /// primary region, then the stash.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            sentinel: self.sentinel.as_ref(),
            slots: self.storage.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Returns an arbitrary key, or [`SetError::Empty`].
    pub fn first(&self) -> Result<&K::Key, SetError> {
        self.iter().next().ok_or(SetError::Empty)
    }

    /// Removes every key, keeping the allocation.
    pub fn clear(&mut self) {
        if self.populated == 0 {
            return;
        }
        self.storage.clear();
        self.sentinel = None;
        self.populated = 0;
    }

    /// Removes every key and, if the table has more than `max_capacity`
    /// primary slots, reallocates it to the smallest power of two at or above
    /// `max_capacity`.
    pub fn clear_to(&mut self, max_capacity: usize) {
        infallible(self.try_clear_to(max_capacity));
    }

    fn try_clear_to(&mut self, max_capacity: usize) -> Result<(), SetError> {
        if self.capacity() <= max_capacity {
            self.clear();
            return Ok(());
        }
        let capacity = max_capacity.next_power_of_two();
        let storage = Storage::try_new(Geometry::new(capacity, self.load_factor)?)?;
        log::debug!(
            "cleared cuckoo table: {} -> {} primary slots",
            self.capacity(),
            capacity
        );
        self.storage = storage;
        self.sentinel = None;
        self.populated = 0;
        self.generation = self.generation.wrapping_add(1);
        Ok(())
    }

    /// Shrinks the table to the smallest power of two that is at least both
    /// `len()` and `max_capacity`. Does nothing if the table is already that
    /// small.
    pub fn shrink_to(&mut self, max_capacity: usize, hasher: impl Fn(&K::Key) -> K::Hash) {
        infallible(self.try_shrink_to(max_capacity, &hasher));
    }

    fn try_shrink_to(
        &mut self,
        max_capacity: usize,
        hasher: &impl Fn(&K::Key) -> K::Hash,
    ) -> Result<(), SetError> {
        let target = max_capacity.max(self.populated);
        if self.capacity() <= target {
            return Ok(());
        }
        self.rebuild(target.next_power_of_two(), "shrink", hasher)
    }

    /// Grows the table so that `additional` more keys fit without a resize.
    pub fn reserve(&mut self, additional: usize, hasher: impl Fn(&K::Key) -> K::Hash) {
        infallible(self.try_reserve(additional, hasher));
    }

    /// Fallible form of [`reserve`](HashTable::reserve). On error the table
    /// is unchanged.
    pub fn try_reserve(
        &mut self,
        additional: usize,
        hasher: impl Fn(&K::Key) -> K::Hash,
    ) -> Result<(), SetError> {
        let needed = self
            .populated
            .checked_add(additional)
            .ok_or(SetError::CapacityOverflow {
                requested: usize::MAX,
                max: MAX_CAPACITY,
            })?;
        if needed < self.storage.geometry.threshold {
            return Ok(());
        }
        let capacity = capacity_for(needed, self.load_factor)?;
        if capacity <= self.capacity() {
            return Ok(());
        }
        self.rebuild(capacity, "reserve", &hasher)
    }

    fn geometry_for(&self, capacity: usize) -> Result<Geometry, SetError> {
        if capacity > self.capacity_limit {
            return Err(SetError::CapacityOverflow {
                requested: capacity,
                max: self.capacity_limit,
            });
        }
        Geometry::new(capacity, self.load_factor)
    }

    /// Moves every slotted key into a freshly allocated table with
    /// `capacity` primary slots, doubling further if the keys do not fit.
    ///
    /// The placement is planned on an index table first and the new array is
    /// allocated before any key moves, so an error leaves `self` untouched.
    #[cold]
    fn rebuild(
        &mut self,
        capacity: usize,
        reason: &str,
        hasher: &impl Fn(&K::Key) -> K::Hash,
    ) -> Result<(), SetError> {
        let mut geometry = self.geometry_for(capacity)?;

        let live = self.populated - usize::from(self.sentinel.is_some());
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(live)
            .map_err(|_| alloc_error::<(usize, K::Hash)>(live))?;
        entries.extend(
            self.storage
                .slots
                .iter()
                .enumerate()
                .filter_map(|(index, slot)| K::get(slot).map(|key| (index, hasher(key)))),
        );

        let plan = loop {
            match plan_placement(geometry, &entries, &mut self.rng)? {
                Some(plan) => break plan,
                None => geometry = self.geometry_for(geometry.capacity << 1)?,
            }
        };

        let mut next = Storage::<K>::try_new(geometry)?;
        for (index, slot) in plan.slots.iter().enumerate() {
            let Some(&entry) = Indices::<K::Hash>::get(slot) else {
                continue;
            };
            let (old_index, _) = entries[entry as usize];
            if let Some(key) = K::take(&mut self.storage.slots[old_index]) {
                next.slots[index] = K::fill(key);
            }
        }
        next.stash_len = plan.stash_len;

        log::debug!(
            "rebuilt cuckoo table ({reason}): {} -> {} primary slots, {} keys, {} stashed",
            self.capacity(),
            geometry.capacity,
            self.populated,
            next.stash_len
        );
        self.storage = next;
        self.generation = self.generation.wrapping_add(1);
        Ok(())
    }

    /// Hands out a cursor according to the table's [`IterationPolicy`].
    pub fn cursor(&mut self) -> Cursor {
        match self.iteration {
            IterationPolicy::Pooled => Cursor::new(self.generation, Some(self.pool.lease())),
            IterationPolicy::Fresh => self.fresh_cursor(),
        }
    }

    /// Returns a cursor outside the pool. It is only invalidated by a resize.
    pub fn fresh_cursor(&self) -> Cursor {
        Cursor::new(self.generation, None)
    }

    pub(crate) fn check_cursor(&self, cursor: &Cursor) -> Result<(), SetError> {
        if cursor.generation() != self.generation {
            return Err(SetError::CursorInvalidated);
        }
        match cursor.lease() {
            Some(lease) if !self.pool.is_current(lease) => Err(SetError::CursorNested),
            _ => Ok(()),
        }
    }

    /// Cursor positions: 0 is the sentinel, `i + 1` is slot `i`.
    pub(crate) fn key_at(&self, position: usize) -> Option<&K::Key> {
        match position.checked_sub(1) {
            None => self.sentinel.as_ref(),
            Some(index) => self.storage.slots.get(index).and_then(|slot| K::get(slot)),
        }
    }

    pub(crate) fn next_live(&self, from: usize) -> Option<usize> {
        (from..self.end_position()).find(|&position| self.key_at(position).is_some())
    }

    /// The cursor position past the last slot.
    pub(crate) fn end_position(&self) -> usize {
        self.storage.slots.len() + 1
    }

    /// Displays the keys in iteration order separated by `separator`.
    pub(crate) fn joined<'a>(&'a self, separator: &'a str) -> Joined<'a, K> {
        Joined {
            keys: self.iter(),
            separator,
        }
    }

    /// Removes the key at a cursor position. The flag reports a stash
    /// compaction, after which the position holds a key not yet visited.
    pub(crate) fn remove_at(&mut self, position: usize) -> Option<(K::Key, bool)> {
        let removed = match position.checked_sub(1) {
            None => (self.sentinel.take()?, false),
            Some(index) if index < self.storage.slots.len() => (
                self.storage.remove_index(index)?,
                index >= self.storage.geometry.capacity,
            ),
            Some(_) => return None,
        };
        self.populated -= 1;
        Some(removed)
    }

    #[cfg(test)]
    pub(crate) fn debug_stats(&self) -> DebugStats {
        let geometry = self.storage.geometry;
        DebugStats {
            populated: self.populated,
            primary: self.storage.slots[..geometry.capacity]
                .iter()
                .filter(|slot| K::get(slot).is_some())
                .count(),
            stash_len: self.storage.stash_len,
            capacity: geometry.capacity,
            threshold: geometry.threshold,
            stash_capacity: geometry.stash_capacity,
            push_iterations: geometry.push_iterations,
            has_sentinel: self.sentinel.is_some(),
            generation: self.generation,
        }
    }
}

impl<K: KeyKind, R: Rng> HashTable<K, R>
where
    K::Key: Eq,
{
    /// Returns the stored key equal to `key`.
    pub fn find(&self, key: &K::Key, hash: K::Hash) -> Option<&K::Key> {
        if K::is_reserved(key) {
            return self.sentinel.as_ref().filter(|sentinel| *sentinel == key);
        }
        let index = self.storage.find(key, hash)?;
        K::get(&self.storage.slots[index])
    }

    /// Returns `true` if the table holds `key`.
    pub fn contains(&self, key: &K::Key, hash: K::Hash) -> bool {
        self.find(key, hash).is_some()
    }

    /// Inserts `key`, returning `false` if it was already present.
    ///
    /// # Panics
    ///
    /// Panics if the table would need more than [`MAX_CAPACITY`] primary
    /// slots, and aborts if the allocator fails.
    pub fn insert(&mut self, key: K::Key, hasher: impl Fn(&K::Key) -> K::Hash) -> bool {
        infallible(self.try_insert(key, hasher))
    }

    /// Inserts `key`, returning `Ok(false)` if it was already present.
    ///
    /// Grows the table (doubling) before the insert when it is at its
    /// threshold, and again whenever the key cannot be placed because the
    /// stash is full. On error the table is unchanged and `key` is dropped.
    pub fn try_insert(
        &mut self,
        key: K::Key,
        hasher: impl Fn(&K::Key) -> K::Hash,
    ) -> Result<bool, SetError> {
        if K::is_reserved(&key) {
            if self.sentinel.is_some() {
                return Ok(false);
            }
            self.sentinel = Some(key);
            self.populated += 1;
            return Ok(true);
        }

        let hash = hasher(&key);
        if self.storage.find(&key, hash).is_some() {
            return Ok(false);
        }

        if self.populated >= self.storage.geometry.threshold {
            self.rebuild(self.capacity() << 1, "load factor", &hasher)?;
        }

        let mut key = key;
        while let Err(homeless) = self.storage.place(key, hash, &hasher, &mut self.rng) {
            key = homeless;
            self.rebuild(self.capacity() << 1, "stash overflow", &hasher)?;
        }
        self.populated += 1;
        Ok(true)
    }

    /// Removes `key` and returns it, or `None` if it was absent.
    pub fn remove(&mut self, key: &K::Key, hash: K::Hash) -> Option<K::Key> {
        let removed = if K::is_reserved(key) {
            self.sentinel.take_if(|sentinel| *sentinel == *key)
        } else {
            let index = self.storage.find(key, hash)?;
            self.storage.remove_index(index)
        };
        if removed.is_some() {
            self.populated -= 1;
        }
        removed
    }
}

/// An iterator over the keys of a [`HashTable`].
pub struct Iter<'a, K: KeyKind> {
    sentinel: Option<&'a K::Key>,
    slots: core::slice::Iter<'a, K::Slot>,
    remaining: usize,
}

impl<'a, K: KeyKind> Iterator for Iter<'a, K> {
    type Item = &'a K::Key;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let key = match self.sentinel.take() {
            Some(key) => key,
            None => self.slots.find_map(|slot| K::get(slot))?,
        };
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: KeyKind> ExactSizeIterator for Iter<'_, K> {}

impl<K: KeyKind> FusedIterator for Iter<'_, K> {}

impl<K: KeyKind> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Self {
            sentinel: self.sentinel,
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

/// The keys of a table separated by a separator, without brackets.
pub(crate) struct Joined<'a, K: KeyKind> {
    keys: Iter<'a, K>,
    separator: &'a str,
}

impl<K: KeyKind> Display for Joined<'_, K>
where
    K::Key: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, key) in self.keys.clone().enumerate() {
            if n > 0 {
                f.write_str(self.separator)?;
            }
            Display::fmt(key, f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DebugStats {
    pub populated: usize,
    pub primary: usize,
    pub stash_len: usize,
    pub capacity: usize,
    pub threshold: usize,
    pub stash_capacity: usize,
    pub push_iterations: usize,
    pub has_sentinel: bool,
    pub generation: u64,
}

#[cfg(test)]
impl DebugStats {
    /// Checks the size bookkeeping every public operation must preserve.
    pub fn assert_consistent(&self) {
        assert!(self.capacity.is_power_of_two(), "{self:?}");
        assert!(self.stash_len <= self.stash_capacity, "{self:?}");
        assert_eq!(
            self.populated,
            self.primary + self.stash_len + usize::from(self.has_sentinel),
            "{self:?}"
        );
    }
}
