use core::fmt::Debug;
use core::fmt::Display;
use core::marker::PhantomData;
use core::mem;

use crate::hash_table::ProbeHash;

/// Describes how keys of one kind are stored in the flat slot array of a
/// [`HashTable`](crate::hash_table::HashTable).
///
/// A kind picks a slot representation with a dedicated "empty" value. Keys
/// that collide with that empty value are *reserved*: the table keeps such a
/// key in an out-of-band sentinel instead of a slot.
pub trait KeyKind {
    /// The key type handed in and out by the table.
    type Key;
    /// The storage cell for one key.
    type Slot;
    /// The hash the table probes with.
    type Hash: ProbeHash;

    /// Returns a slot holding no key.
    fn empty() -> Self::Slot;

    /// Returns `true` if `key` cannot be stored in a slot because it is
    /// indistinguishable from [`empty`](KeyKind::empty).
    fn is_reserved(key: &Self::Key) -> bool;

    /// Wraps a non-reserved key into a slot.
    fn fill(key: Self::Key) -> Self::Slot;

    /// Borrows the key held in `slot`, if any.
    fn get(slot: &Self::Slot) -> Option<&Self::Key>;

    /// Moves the key out of `slot`, leaving it empty.
    fn take(slot: &mut Self::Slot) -> Option<Self::Key>;

    /// Stores `key` in `slot` and returns the previous occupant.
    fn replace(slot: &mut Self::Slot, key: Self::Key) -> Option<Self::Key>;
}

/// Machine integers usable as keys of an [`IntSet`](crate::IntSet).
///
/// The value zero doubles as the empty-slot marker, so a set tracks the key
/// `0` separately.
pub trait PrimitiveKey: Copy + Eq + Debug + Display {
    /// The zero value of the type.
    const ZERO: Self;

    /// `u32` for types of 32 bits or less, `u64` otherwise.
    type Hash: ProbeHash;

    /// The key's bits as a probe hash: the identity, sign-extended for
    /// narrow signed types.
    fn probe_hash(self) -> Self::Hash;

    /// Folds the key to 32 bits for content hashes.
    fn hash32(self) -> u32;
}

macro_rules! impl_narrow_key {
    ($($ty:ty => |$v:ident| $hash:expr),* $(,)?) => {
        $(
            impl PrimitiveKey for $ty {
                const ZERO: Self = 0;
                type Hash = u32;

                #[inline(always)]
                fn probe_hash(self) -> u32 {
                    let $v = self;
                    $hash
                }

                #[inline(always)]
                fn hash32(self) -> u32 {
                    self.probe_hash()
                }
            }
        )*
    };
}

macro_rules! impl_wide_key {
    ($($ty:ty => |$v:ident| $hash:expr),* $(,)?) => {
        $(
            impl PrimitiveKey for $ty {
                const ZERO: Self = 0;
                type Hash = u64;

                #[inline(always)]
                fn probe_hash(self) -> u64 {
                    let $v = self;
                    $hash
                }

                #[inline(always)]
                fn hash32(self) -> u32 {
                    let h = self.probe_hash();
                    (h ^ (h >> 32)) as u32
                }
            }
        )*
    };
}

impl_narrow_key! {
    i8 => |v| v as i32 as u32,
    i16 => |v| v as i32 as u32,
    i32 => |v| v as u32,
    u8 => |v| v as u32,
    u16 => |v| v as u32,
    u32 => |v| v,
}

impl_wide_key! {
    i64 => |v| v as u64,
    isize => |v| v as i64 as u64,
    u64 => |v| v,
    usize => |v| v as u64,
}

/// Integer keys stored unboxed; zero marks an empty slot.
pub struct IntKeys<I>(PhantomData<I>);

impl<I: PrimitiveKey> KeyKind for IntKeys<I> {
    type Key = I;
    type Slot = I;
    type Hash = I::Hash;

    #[inline(always)]
    fn empty() -> I {
        I::ZERO
    }

    #[inline(always)]
    fn is_reserved(key: &I) -> bool {
        *key == I::ZERO
    }

    #[inline(always)]
    fn fill(key: I) -> I {
        debug_assert!(key != I::ZERO);
        key
    }

    #[inline(always)]
    fn get(slot: &I) -> Option<&I> {
        (*slot != I::ZERO).then_some(slot)
    }

    #[inline(always)]
    fn take(slot: &mut I) -> Option<I> {
        let key = mem::replace(slot, I::ZERO);
        (key != I::ZERO).then_some(key)
    }

    #[inline(always)]
    fn replace(slot: &mut I, key: I) -> Option<I> {
        let previous = mem::replace(slot, key);
        (previous != I::ZERO).then_some(previous)
    }
}

/// Arbitrary keys stored as `Option<T>`. No key is reserved: the absence value
/// cannot be expressed as a `T`.
pub struct ObjectKeys<T>(PhantomData<T>);

impl<T> KeyKind for ObjectKeys<T> {
    type Key = T;
    type Slot = Option<T>;
    type Hash = u32;

    #[inline(always)]
    fn empty() -> Option<T> {
        None
    }

    #[inline(always)]
    fn is_reserved(_: &T) -> bool {
        false
    }

    #[inline(always)]
    fn fill(key: T) -> Option<T> {
        Some(key)
    }

    #[inline(always)]
    fn get(slot: &Option<T>) -> Option<&T> {
        slot.as_ref()
    }

    #[inline(always)]
    fn take(slot: &mut Option<T>) -> Option<T> {
        slot.take()
    }

    #[inline(always)]
    fn replace(slot: &mut Option<T>, key: T) -> Option<T> {
        slot.replace(key)
    }
}

/// Positions into a caller-owned list, used to plan a rehash before any key
/// is moved. Probes with the hash width `H` of the keys being planned.
pub(crate) struct Indices<H>(PhantomData<H>);

const NO_INDEX: u32 = u32::MAX;

impl<H: ProbeHash> KeyKind for Indices<H> {
    type Key = u32;
    type Slot = u32;
    type Hash = H;

    #[inline(always)]
    fn empty() -> u32 {
        NO_INDEX
    }

    #[inline(always)]
    fn is_reserved(key: &u32) -> bool {
        *key == NO_INDEX
    }

    #[inline(always)]
    fn fill(key: u32) -> u32 {
        key
    }

    #[inline(always)]
    fn get(slot: &u32) -> Option<&u32> {
        (*slot != NO_INDEX).then_some(slot)
    }

    #[inline(always)]
    fn take(slot: &mut u32) -> Option<u32> {
        let key = mem::replace(slot, NO_INDEX);
        (key != NO_INDEX).then_some(key)
    }

    #[inline(always)]
    fn replace(slot: &mut u32, key: u32) -> Option<u32> {
        let previous = mem::replace(slot, key);
        (previous != NO_INDEX).then_some(previous)
    }
}
