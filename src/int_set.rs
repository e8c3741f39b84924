use core::fmt;
use core::fmt::Debug;
use core::fmt::Display;
use core::hash::Hash;
use core::hash::Hasher;
use core::iter::FusedIterator;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::cursor::Cursor;
use crate::cursor::CursorTarget;
use crate::error::SetError;
use crate::error::infallible;
use crate::hash_table;
use crate::hash_table::HashTable;
use crate::key::IntKeys;
use crate::key::PrimitiveKey;

fn hash_key<I: PrimitiveKey>(key: &I) -> I::Hash {
    key.probe_hash()
}

/// An unordered set of machine integers.
///
/// Keys are stored unboxed in a flat array and probed with three cuckoo
/// hashes derived from the key itself. Zero is tracked outside the array, so
/// every value of `I` can be stored.
///
/// # Examples
///
/// ```rust
/// use cuckoo_set::IntSet;
///
/// let mut set: IntSet<i64> = IntSet::new();
/// assert!(set.insert(0));
/// assert!(set.insert(-7));
/// assert!(!set.insert(-7));
/// assert!(set.contains(0));
/// assert_eq!(set.len(), 2);
/// ```
pub struct IntSet<I: PrimitiveKey, R = SmallRng> {
    table: HashTable<IntKeys<I>, R>,
}

impl<I: PrimitiveKey> IntSet<I> {
    /// Creates an empty set with the default [`Config`]: room for 51 keys at
    /// a load factor of 0.8.
    pub fn new() -> Self {
        infallible(Self::with_config(Config::default()))
    }
}

impl<I: PrimitiveKey, R: Rng + SeedableRng> IntSet<I, R> {
    /// Creates an empty set that holds `initial_capacity` keys before
    /// growing.
    ///
    /// Fails if `load_factor` is not in `(0, 1]` or the capacity exceeds the
    /// largest table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cuckoo_set::IntSet;
    /// use cuckoo_set::SetError;
    ///
    /// let set: IntSet<u32> = IntSet::with_capacity(16, 0.8).unwrap();
    /// assert_eq!(set.capacity(), 32);
    ///
    /// let err = IntSet::<u32>::with_capacity(16, 0.0).unwrap_err();
    /// assert_eq!(err, SetError::InvalidLoadFactor(0.0));
    /// ```
    pub fn with_capacity(initial_capacity: usize, load_factor: f32) -> Result<Self, SetError> {
        Self::with_config(
            Config::default()
                .with_initial_capacity(initial_capacity)
                .with_load_factor(load_factor),
        )
    }

    /// Creates an empty set from `config`.
    pub fn with_config(config: Config) -> Result<Self, SetError> {
        Ok(Self {
            table: HashTable::with_config(config)?,
        })
    }
}

impl<I: PrimitiveKey, R: Rng> IntSet<I, R> {
    /// Creates an empty set from `config` that draws displacement choices
    /// from `rng`.
    pub fn with_config_and_rng(config: Config, rng: R) -> Result<Self, SetError> {
        Ok(Self {
            table: HashTable::with_config_and_rng(config, rng)?,
        })
    }

    /// Returns the number of keys in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of primary slots. The set grows once it holds
    /// `capacity() * load_factor` keys.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Adds `key`, returning `false` if it was already present.
    ///
    /// # Panics
    ///
    /// Panics if the set would outgrow the largest table, and aborts if the
    /// allocator fails. See [`try_insert`](IntSet::try_insert).
    pub fn insert(&mut self, key: I) -> bool {
        self.table.insert(key, hash_key::<I>)
    }

    /// Adds `key`, returning `Ok(false)` if it was already present. On error
    /// the set is unchanged.
    pub fn try_insert(&mut self, key: I) -> Result<bool, SetError> {
        self.table.try_insert(key, hash_key::<I>)
    }

    /// Returns `true` if the set holds `key`.
    pub fn contains(&self, key: I) -> bool {
        self.table.contains(&key, key.probe_hash())
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: I) -> bool {
        self.table.remove(&key, key.probe_hash()).is_some()
    }

    /// Returns an arbitrary key of the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cuckoo_set::IntSet;
    /// use cuckoo_set::SetError;
    ///
    /// let mut set: IntSet<u16> = IntSet::new();
    /// assert_eq!(set.first(), Err(SetError::Empty));
    /// set.insert(9);
    /// assert_eq!(set.first(), Ok(9));
    /// ```
    pub fn first(&self) -> Result<I, SetError> {
        self.table.first().copied()
    }

    /// Grows the set so that `additional` more keys fit without a resize.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional, hash_key::<I>);
    }

    /// Fallible form of [`reserve`](IntSet::reserve). On error the set is
    /// unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), SetError> {
        self.table.try_reserve(additional, hash_key::<I>)
    }

    /// Shrinks the set to the smallest power of two that holds both `len()`
    /// and `max_capacity` slots. Does nothing if it is already that small.
    pub fn shrink_to(&mut self, max_capacity: usize) {
        self.table.shrink_to(max_capacity, hash_key::<I>);
    }

    /// Removes every key, keeping the allocation.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Removes every key and reallocates down to `max_capacity` slots
    /// (rounded up to a power of two) if the set is larger.
    pub fn clear_to(&mut self, max_capacity: usize) {
        self.table.clear_to(max_capacity);
    }

    /// Returns an iterator over the keys in no particular order.
    pub fn iter(&self) -> Iter<'_, I> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Hands out a cursor that can remove keys while iterating.
    ///
    /// Under [`IterationPolicy::Pooled`](crate::IterationPolicy::Pooled) the
    /// cursor comes from the set's pool of two and supersedes the cursor
    /// handed out before it; use [`fresh_cursor`](IntSet::fresh_cursor) for
    /// nested loops.
    pub fn cursor(&mut self) -> Cursor {
        self.table.cursor()
    }

    /// Returns a cursor outside the pool, valid until the set resizes.
    pub fn fresh_cursor(&self) -> Cursor {
        self.table.fresh_cursor()
    }

    /// Order-independent hash of the contents: the wrapping sum of the key
    /// hashes. Equal sets have equal content hashes.
    pub fn content_hash(&self) -> u32 {
        self.iter()
            .fold(0u32, |sum, key| sum.wrapping_add(key.hash32()))
    }

    /// Renders the keys separated by `separator`, without brackets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cuckoo_set::IntSet;
    ///
    /// let set: IntSet<i32> = [0, 4].into_iter().collect();
    /// assert_eq!(set.join("|"), "0|4");
    /// assert_eq!(set.to_string(), "[0, 4]");
    /// ```
    pub fn join(&self, separator: &str) -> String {
        self.table.joined(separator).to_string()
    }

    #[cfg(test)]
    pub(crate) fn debug_stats(&self) -> hash_table::DebugStats {
        self.table.debug_stats()
    }
}

impl<I: PrimitiveKey> Default for IntSet<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: PrimitiveKey, R: Clone> Clone for IntSet<I, R> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<I: PrimitiveKey, R: Rng> PartialEq for IntSet<I, R> {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|key| other.contains(key))
    }
}

impl<I: PrimitiveKey, R: Rng> Eq for IntSet<I, R> {}

impl<I: PrimitiveKey, R: Rng> Hash for IntSet<I, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        state.write_u32(self.content_hash());
    }
}

impl<I: PrimitiveKey, R: Rng> Debug for IntSet<I, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<I: PrimitiveKey, R: Rng> Display for IntSet<I, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.table.joined(", "))
    }
}

impl<I: PrimitiveKey, R: Rng> CursorTarget for IntSet<I, R> {
    type Kind = IntKeys<I>;
    type Rng = R;

    fn table(&self) -> &HashTable<IntKeys<I>, R> {
        &self.table
    }

    fn table_mut(&mut self) -> &mut HashTable<IntKeys<I>, R> {
        &mut self.table
    }
}

impl<I: PrimitiveKey, R: Rng + SeedableRng> FromIterator<I> for IntSet<I, R> {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        let mut set = infallible(Self::with_config(Config::default()));
        set.extend(iter);
        set
    }
}

impl<I: PrimitiveKey, R: Rng> Extend<I> for IntSet<I, R> {
    fn extend<T: IntoIterator<Item = I>>(&mut self, iter: T) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, I: PrimitiveKey, R: Rng> Extend<&'a I> for IntSet<I, R> {
    fn extend<T: IntoIterator<Item = &'a I>>(&mut self, iter: T) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, I: PrimitiveKey, R: Rng> IntoIterator for &'a IntSet<I, R> {
    type IntoIter = Iter<'a, I>;
    type Item = I;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the keys of an [`IntSet`].
pub struct Iter<'a, I: PrimitiveKey> {
    inner: hash_table::Iter<'a, IntKeys<I>>,
}

impl<I: PrimitiveKey> Iterator for Iter<'_, I> {
    type Item = I;

    fn next(&mut self) -> Option<I> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<I: PrimitiveKey> ExactSizeIterator for Iter<'_, I> {}

impl<I: PrimitiveKey> FusedIterator for Iter<'_, I> {}
