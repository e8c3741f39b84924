use core::fmt;
use core::fmt::Debug;
use core::fmt::Display;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::DefaultHashBuilder;
use crate::config::Config;
use crate::cursor::Cursor;
use crate::cursor::CursorTarget;
use crate::error::SetError;
use crate::error::infallible;
use crate::hash_table;
use crate::hash_table::HashTable;
use crate::key::ObjectKeys;

/// Folds a 64-bit hash into the 32 bits the table probes with.
#[inline(always)]
fn make_hash<T: Hash + ?Sized, S: BuildHasher>(hash_builder: &S, value: &T) -> u32 {
    let hash = hash_builder.hash_one(value);
    (hash ^ (hash >> 32)) as u32
}

/// An unordered set of hashable values backed by the cuckoo [`HashTable`].
///
/// `ObjectSet<T, S>` hashes values through the [`BuildHasher`] `S`. Every
/// value of `T` is storable; an absent key is expressed with `Option` at the
/// API boundary, never inside the set.
///
/// # Examples
///
/// ```rust
/// use cuckoo_set::ObjectSet;
///
/// let mut set: ObjectSet<String> = ObjectSet::new();
/// assert!(set.insert("cuckoo".to_string()));
/// assert!(!set.insert("cuckoo".to_string()));
/// assert!(set.contains(&"cuckoo".to_string()));
/// ```
pub struct ObjectSet<T, S = DefaultHashBuilder, R = SmallRng> {
    table: HashTable<ObjectKeys<T>, R>,
    hash_builder: S,
}

impl<T, S> ObjectSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty set with the default [`Config`] and hasher.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty set that holds `initial_capacity` values before
    /// growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cuckoo_set::ObjectSet;
    ///
    /// let set: ObjectSet<&str> = ObjectSet::with_capacity(100, 0.5).unwrap();
    /// assert_eq!(set.capacity(), 256);
    /// assert!(ObjectSet::<&str>::with_capacity(100, 1.5).is_err());
    /// ```
    pub fn with_capacity(initial_capacity: usize, load_factor: f32) -> Result<Self, SetError> {
        Self::with_config_and_hasher(
            Config::default()
                .with_initial_capacity(initial_capacity)
                .with_load_factor(load_factor),
            S::default(),
        )
    }
}

impl<T, S> ObjectSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty set with the default [`Config`] and the given hasher
    /// builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        infallible(Self::with_config_and_hasher(Config::default(), hash_builder))
    }
}

impl<T, S, R> ObjectSet<T, S, R>
where
    T: Hash + Eq,
    S: BuildHasher,
    R: Rng + SeedableRng,
{
    /// Creates an empty set from `config` with the default hasher.
    pub fn with_config(config: Config) -> Result<Self, SetError>
    where
        S: Default,
    {
        Self::with_config_and_hasher(config, S::default())
    }

    /// Creates an empty set from `config` with the given hasher builder.
    pub fn with_config_and_hasher(config: Config, hash_builder: S) -> Result<Self, SetError> {
        Ok(Self {
            table: HashTable::with_config(config)?,
            hash_builder,
        })
    }
}

impl<T, S, R> ObjectSet<T, S, R>
where
    T: Hash + Eq,
    S: BuildHasher,
    R: Rng,
{
    /// Creates an empty set from `config` with the given hasher builder that
    /// draws displacement choices from `rng`.
    pub fn with_parts(config: Config, hash_builder: S, rng: R) -> Result<Self, SetError> {
        Ok(Self {
            table: HashTable::with_config_and_rng(config, rng)?,
            hash_builder,
        })
    }

    /// Returns the number of values in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of primary slots.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the set's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. An equal value already
    /// in the set is kept and `value` is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cuckoo_set::ObjectSet;
    ///
    /// let mut set: ObjectSet<i32> = ObjectSet::new();
    /// assert_eq!(set.insert(37), true);
    /// assert_eq!(set.insert(37), false);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        self.table
            .insert(value, |v| make_hash(&self.hash_builder, v))
    }

    /// Fallible form of [`insert`](ObjectSet::insert). On error the set is
    /// unchanged and `value` is dropped.
    pub fn try_insert(&mut self, value: T) -> Result<bool, SetError> {
        self.table
            .try_insert(value, |v| make_hash(&self.hash_builder, v))
    }

    /// Returns `true` if the set contains a value equal to `value`.
    pub fn contains(&self, value: &T) -> bool {
        self.table
            .contains(value, make_hash(&self.hash_builder, value))
    }

    /// Returns the stored value equal to `value`, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cuckoo_set::ObjectSet;
    ///
    /// let mut set: ObjectSet<String> = ObjectSet::new();
    /// set.insert("a".to_string());
    /// assert_eq!(set.get(&"a".to_string()).map(String::as_str), Some("a"));
    /// assert_eq!(set.get(&"b".to_string()), None);
    /// ```
    pub fn get(&self, value: &T) -> Option<&T> {
        self.table.find(value, make_hash(&self.hash_builder, value))
    }

    /// Removes a value from the set. Returns whether the value was present.
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the stored value equal to `value`, if any.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let hash = make_hash(&self.hash_builder, value);
        self.table.remove(value, hash)
    }

    /// Returns an arbitrary value of the set, or [`SetError::Empty`].
    pub fn first(&self) -> Result<&T, SetError> {
        self.table.first()
    }

    /// Grows the set so that `additional` more values fit without a resize.
    pub fn reserve(&mut self, additional: usize) {
        self.table
            .reserve(additional, |v| make_hash(&self.hash_builder, v));
    }

    /// Fallible form of [`reserve`](ObjectSet::reserve). On error the set is
    /// unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), SetError> {
        self.table
            .try_reserve(additional, |v| make_hash(&self.hash_builder, v))
    }

    /// Shrinks the set to the smallest power of two that holds both `len()`
    /// and `max_capacity` slots.
    pub fn shrink_to(&mut self, max_capacity: usize) {
        self.table
            .shrink_to(max_capacity, |v| make_hash(&self.hash_builder, v));
    }

    /// Removes all values, keeping the allocation.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Removes all values and reallocates down to `max_capacity` slots if the
    /// set is larger.
    pub fn clear_to(&mut self, max_capacity: usize) {
        self.table.clear_to(max_capacity);
    }

    /// Returns an iterator over the values of the set.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Hands out a cursor that can remove values while iterating. See
    /// [`IntSet::cursor`](crate::IntSet::cursor).
    pub fn cursor(&mut self) -> Cursor {
        self.table.cursor()
    }

    /// Returns a cursor outside the pool, valid until the set resizes.
    pub fn fresh_cursor(&self) -> Cursor {
        self.table.fresh_cursor()
    }

    /// Order-independent hash of the contents under the set's hasher.
    ///
    /// Two equal sets agree on it when their hasher builders produce the same
    /// hashes, which holds for the deterministic [`DefaultHashBuilder`].
    pub fn content_hash(&self) -> u32 {
        self.iter().fold(0u32, |sum, value| {
            sum.wrapping_add(make_hash(&self.hash_builder, value))
        })
    }

    /// Renders the values separated by `separator`, without brackets.
    pub fn join(&self, separator: &str) -> String
    where
        T: Display,
    {
        self.table.joined(separator).to_string()
    }

    #[cfg(test)]
    pub(crate) fn debug_stats(&self) -> hash_table::DebugStats {
        self.table.debug_stats()
    }
}

impl<T, S> Default for ObjectSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S, R> Clone for ObjectSet<T, S, R>
where
    T: Clone,
    S: Clone,
    R: Clone,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            hash_builder: self.hash_builder.clone(),
        }
    }
}

impl<T, S, R> PartialEq for ObjectSet<T, S, R>
where
    T: Hash + Eq,
    S: BuildHasher,
    R: Rng,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S, R> Eq for ObjectSet<T, S, R>
where
    T: Hash + Eq,
    S: BuildHasher,
    R: Rng,
{
}

impl<T, S, R> Debug for ObjectSet<T, S, R>
where
    T: Debug,
    R: Rng,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.table.iter()).finish()
    }
}

impl<T, S, R> Display for ObjectSet<T, S, R>
where
    T: Display,
    R: Rng,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.table.joined(", "))
    }
}

impl<T, S, R> CursorTarget for ObjectSet<T, S, R>
where
    R: Rng,
{
    type Kind = ObjectKeys<T>;
    type Rng = R;

    fn table(&self) -> &HashTable<ObjectKeys<T>, R> {
        &self.table
    }

    fn table_mut(&mut self) -> &mut HashTable<ObjectKeys<T>, R> {
        &mut self.table
    }
}

impl<T, S, R> FromIterator<T> for ObjectSet<T, S, R>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
    R: Rng + SeedableRng,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = infallible(Self::with_config(Config::default()));
        set.extend(iter);
        set
    }
}

impl<T, S, R> Extend<T> for ObjectSet<T, S, R>
where
    T: Hash + Eq,
    S: BuildHasher,
    R: Rng,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, S, R> Extend<&'a T> for ObjectSet<T, S, R>
where
    T: Hash + Eq + Copy + 'a,
    S: BuildHasher,
    R: Rng,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, T, S, R> IntoIterator for &'a ObjectSet<T, S, R>
where
    T: Hash + Eq,
    S: BuildHasher,
    R: Rng,
{
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the values of an [`ObjectSet`].
pub struct Iter<'a, T> {
    inner: hash_table::Iter<'a, ObjectKeys<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
