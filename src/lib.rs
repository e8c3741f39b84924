#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

/// Construction parameters shared by every set.
pub mod config;

/// Detached cursors that can remove keys while iterating.
pub mod cursor;

/// The error type reported by fallible operations.
pub mod error;

/// The three-way cuckoo hashing engine behind both sets.
pub mod hash_table;

/// Key representations the table can store.
pub mod key;

/// A set of machine integers with an out-of-band zero key.
pub mod int_set;

/// A set of arbitrary hashable values.
///
/// This module provides an `ObjectSet` that wraps the `HashTable` and hashes
/// values through a configurable hasher builder.
pub mod object_set;

pub use config::Config;
pub use config::IterationPolicy;
pub use cursor::Cursor;
pub use cursor::CursorTarget;
pub use error::SetError;
pub use hash_table::HashTable;
pub use int_set::IntSet;
pub use object_set::ObjectSet;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder [`ObjectSet`] uses unless another is given.
        ///
        /// It is seeded with a fixed value, so independently built sets hash
        /// equal values identically.
        pub type DefaultHashBuilder = foldhash::fast::FixedState;
    } else {
        /// The hasher builder [`ObjectSet`] uses unless another is given.
        pub type DefaultHashBuilder = core::hash::BuildHasherDefault<std::hash::DefaultHasher>;
    }
}
