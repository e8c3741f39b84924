use std::alloc::Layout;

/// Errors reported by the sets and their cursors.
///
/// Every variant is a precondition the caller can avoid; none of them leaves
/// the set in a modified state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SetError {
    /// The load factor was not a finite value in `(0, 1]`.
    #[error("load factor must be in (0, 1], got {0}")]
    InvalidLoadFactor(f32),

    /// A capacity request exceeded the largest representable table.
    #[error("requested capacity {requested} exceeds the maximum of {max} slots")]
    CapacityOverflow {
        /// The number of slots (or elements) that was asked for.
        requested: usize,
        /// The largest primary region a table may have.
        max: usize,
    },

    /// The allocator could not provide a new backing array.
    #[error("failed to allocate {} bytes for the key table", .layout.size())]
    AllocationFailed {
        /// The layout that was requested.
        layout: Layout,
    },

    /// The set holds no elements.
    #[error("the set is empty")]
    Empty,

    /// The cursor has no element ahead of it.
    #[error("no more elements")]
    Exhausted,

    /// `remove` was called before `next`, or twice without a `next` between.
    #[error("next must be called before remove")]
    RemoveWithoutNext,

    /// A later pooled cursor superseded this one.
    #[error("pooled cursor was superseded; use a fresh cursor for nested iteration")]
    CursorNested,

    /// The table reallocated its storage after the cursor was created.
    #[error("cursor was invalidated by a resize of the set")]
    CursorInvalidated,
}

/// Unwraps the result of a growth operation for the infallible API surface,
/// following the std collections: allocation failure aborts, anything else
/// panics.
pub(crate) fn infallible<T>(result: Result<T, SetError>) -> T {
    match result {
        Ok(value) => value,
        Err(SetError::AllocationFailed { layout }) => std::alloc::handle_alloc_error(layout),
        Err(err) => panic!("{err}"),
    }
}
