use crate::error::SetError;
use crate::hash_table::MAX_CAPACITY;

/// Decides what [`cursor`](crate::IntSet::cursor) hands out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IterationPolicy {
    /// Cursors come from a pool of two per set. Handing one out invalidates
    /// the other, so nested iteration through `cursor` is reported as an
    /// error when the outer cursor is used again.
    #[default]
    Pooled,
    /// Every cursor is independent and only invalidated by a resize.
    Fresh,
}

/// Seed used for the displacement RNG when none is given.
pub const DEFAULT_SEED: u64 = 0x2545_f491_4f6c_dd1d;

/// Construction parameters for a set.
///
/// # Examples
///
/// ```rust
/// use cuckoo_set::Config;
/// use cuckoo_set::IntSet;
/// use cuckoo_set::IterationPolicy;
///
/// let config = Config::default()
///     .with_initial_capacity(1000)
///     .with_load_factor(0.5)
///     .with_iteration(IterationPolicy::Fresh)
///     .with_seed(7);
/// let set: IntSet<u32> = IntSet::with_config(config).unwrap();
/// assert!(set.capacity() >= 2000);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    initial_capacity: usize,
    load_factor: f32,
    iteration: IterationPolicy,
    seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: 51,
            load_factor: 0.8,
            iteration: IterationPolicy::Pooled,
            seed: DEFAULT_SEED,
        }
    }
}

impl Config {
    /// Number of elements the set should hold before its first resize.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Fill ratio of the primary region that triggers growth.
    pub fn with_load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// How cursors are handed out; see [`IterationPolicy`].
    pub fn with_iteration(mut self, iteration: IterationPolicy) -> Self {
        self.iteration = iteration;
        self
    }

    /// Seed for the displacement RNG of sets built with
    /// [`with_config`](crate::IntSet::with_config).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Requested element count before the first resize.
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// Configured load factor.
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Configured iteration policy.
    pub fn iteration(&self) -> IterationPolicy {
        self.iteration
    }

    /// Configured RNG seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Checks the parameters and returns the primary capacity to allocate.
    pub(crate) fn validate(&self) -> Result<usize, SetError> {
        check_load_factor(self.load_factor)?;
        capacity_for(self.initial_capacity, self.load_factor)
    }
}

pub(crate) fn check_load_factor(load_factor: f32) -> Result<(), SetError> {
    if load_factor.is_finite() && load_factor > 0.0 && load_factor <= 1.0 {
        Ok(())
    } else {
        Err(SetError::InvalidLoadFactor(load_factor))
    }
}

/// Smallest power-of-two primary capacity that keeps `elements` at or below
/// the load factor.
pub(crate) fn capacity_for(elements: usize, load_factor: f32) -> Result<usize, SetError> {
    let overflow = SetError::CapacityOverflow {
        requested: elements,
        max: MAX_CAPACITY,
    };
    let slots = (elements as f64 / load_factor as f64).ceil();
    if slots > MAX_CAPACITY as f64 {
        return Err(overflow);
    }
    let capacity = (slots as usize).next_power_of_two();
    if capacity > MAX_CAPACITY {
        return Err(overflow);
    }
    Ok(capacity)
}
