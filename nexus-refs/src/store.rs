//! Value tables addressed by slot identifier.
//!
//! A [`ValueStore`] is the host-owned side of the indirection: it maps
//! identifiers to [`Entry`] cells. A cell either holds a live value or, once
//! released, a link to the next free identifier. The free list is threaded
//! through the same cells, anchored at [`SlotIndex::FREE_HEAD`].
//!
//! The store itself knows nothing about the free list. Only
//! [`SlotAllocator`](crate::SlotAllocator) writes links or touches the head
//! cell; everything else goes through it.

use std::collections::HashMap;
use std::hash::BuildHasher;

use tracing::trace;

use crate::{RefError, SlotIndex};

/// A cell in the value table - either a free-list link or a live value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry<T, Idx: SlotIndex = u32> {
    /// Cell is free.
    Vacant {
        /// Next identifier in the free list, or `FREE_HEAD` at the end of the
        /// chain.
        next_free: Idx,
    },
    /// Cell holds a value.
    Occupied {
        /// The stored value.
        value: T,
    },
}

impl<T, Idx: SlotIndex> Entry<T, Idx> {
    /// An empty free-list link.
    pub const EMPTY: Self = Entry::Vacant {
        next_free: Idx::FREE_HEAD,
    };

    /// Returns `true` if the cell holds a value.
    #[inline]
    pub const fn is_occupied(&self) -> bool {
        matches!(self, Entry::Occupied { .. })
    }

    /// Returns the held value, if any.
    #[inline]
    pub fn value(&self) -> Option<&T> {
        match self {
            Entry::Occupied { value } => Some(value),
            Entry::Vacant { .. } => None,
        }
    }

    /// Returns the held value mutably, if any.
    #[inline]
    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Entry::Occupied { value } => Some(value),
            Entry::Vacant { .. } => None,
        }
    }

    /// Consumes the cell, returning the held value, if any.
    #[inline]
    pub fn into_value(self) -> Option<T> {
        match self {
            Entry::Occupied { value } => Some(value),
            Entry::Vacant { .. } => None,
        }
    }

    /// Returns the free-list link, if the cell is vacant.
    #[inline]
    pub fn next_free(&self) -> Option<Idx> {
        match self {
            Entry::Vacant { next_free } => Some(*next_free),
            Entry::Occupied { .. } => None,
        }
    }
}

/// Table of [`Entry`] cells addressed by slot identifier.
///
/// # Requirements
///
/// - Identifier `FREE_HEAD` (`0`) must behave as an ordinary writable cell.
/// - [`reserve_slot`](Self::reserve_slot) is the only step allowed to
///   allocate. Once it succeeds for an identifier,
///   [`replace_slot`](Self::replace_slot) on that identifier must not fail.
/// - Cells are never moved or dropped behind the allocator's back.
///
/// # Implementations
///
/// - [`VecStore`] - dense table, identifiers index directly into a `Vec`
/// - `HashMap<Idx, Entry<T, Idx>, S>` - sparse table for hosts that already
///   keep an associative container
pub trait ValueStore<T> {
    /// Identifier type for this store.
    type Index: SlotIndex;

    /// Returns the cell at `id`, if the store has one.
    fn slot(&self, id: Self::Index) -> Option<&Entry<T, Self::Index>>;

    /// Returns the cell at `id` mutably, if the store has one.
    fn slot_mut(&mut self, id: Self::Index) -> Option<&mut Entry<T, Self::Index>>;

    /// Makes `id` writable, allocating if needed.
    ///
    /// # Errors
    ///
    /// Returns [`RefError::AllocationFailed`] if the table cannot grow. The
    /// store is left unchanged.
    fn reserve_slot(&mut self, id: Self::Index) -> Result<(), RefError>;

    /// Writes `entry` at `id`, returning the previous cell.
    ///
    /// # Panics
    ///
    /// May panic if `id` was never reserved.
    fn replace_slot(
        &mut self,
        id: Self::Index,
        entry: Entry<T, Self::Index>,
    ) -> Option<Entry<T, Self::Index>>;
}

// =============================================================================
// VecStore - dense table
// =============================================================================

/// Dense value table backed by a `Vec`.
///
/// Cell `0` is created up front as the free-list head, so identifiers index
/// straight into the vector. Grows on demand; never shrinks.
///
/// # Example
///
/// ```
/// use nexus_refs::{SlotAllocator, VecStore};
///
/// let mut store: VecStore<&str> = VecStore::new();
/// let mut alloc = SlotAllocator::new();
///
/// let id = alloc.acquire(&mut store, Some("hello")).unwrap();
/// assert_eq!(alloc.get(&store, id), Some(&"hello"));
/// assert_eq!(alloc.release(&mut store, id), Some("hello"));
/// ```
#[derive(Debug, Clone)]
pub struct VecStore<T, Idx: SlotIndex = u32> {
    entries: Vec<Entry<T, Idx>>,
}

impl<T, Idx: SlotIndex> VecStore<T, Idx> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a table with room for `capacity` slots before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut entries = Vec::with_capacity(capacity.saturating_add(1));
        entries.push(Entry::EMPTY);
        Self { entries }
    }

    /// Fallible form of [`with_capacity`](Self::with_capacity).
    ///
    /// # Errors
    ///
    /// Returns [`RefError::AllocationFailed`] if the table cannot be allocated.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, RefError> {
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(capacity.saturating_add(1))
            .map_err(|_| RefError::AllocationFailed)?;
        entries.push(Entry::EMPTY);
        Ok(Self { entries })
    }

    /// Number of slot cells, live or free, excluding the free-list head.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len() - 1
    }

    /// Returns `true` if no slot has ever been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 1
    }

    /// Number of slot cells the table can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.capacity() - 1
    }

    /// Iterates over live values with their identifiers, in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (Idx, &T)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(i, entry)| entry.value().map(|v| (Idx::from_usize(i), v)))
    }
}

impl<T, Idx: SlotIndex> Default for VecStore<T, Idx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Idx: SlotIndex> ValueStore<T> for VecStore<T, Idx> {
    type Index = Idx;

    #[inline]
    fn slot(&self, id: Idx) -> Option<&Entry<T, Idx>> {
        self.entries.get(id.as_usize())
    }

    #[inline]
    fn slot_mut(&mut self, id: Idx) -> Option<&mut Entry<T, Idx>> {
        self.entries.get_mut(id.as_usize())
    }

    fn reserve_slot(&mut self, id: Idx) -> Result<(), RefError> {
        let i = id.as_usize();
        if i < self.entries.len() {
            return Ok(());
        }

        let additional = i + 1 - self.entries.len();
        if self.entries.capacity() - self.entries.len() < additional {
            self.entries
                .try_reserve(additional)
                .map_err(|_| RefError::AllocationFailed)?;
            trace!(
                slots = i,
                capacity = self.entries.capacity() - 1,
                "value table grew"
            );
        }

        // Gap cells are unlinked vacancies; the allocator never hands them out.
        self.entries.resize_with(i + 1, || Entry::EMPTY);
        Ok(())
    }

    #[inline]
    fn replace_slot(&mut self, id: Idx, entry: Entry<T, Idx>) -> Option<Entry<T, Idx>> {
        Some(std::mem::replace(&mut self.entries[id.as_usize()], entry))
    }
}

// =============================================================================
// HashMap implementation
// =============================================================================

impl<T, Idx: SlotIndex, S: BuildHasher> ValueStore<T> for HashMap<Idx, Entry<T, Idx>, S> {
    type Index = Idx;

    #[inline]
    fn slot(&self, id: Idx) -> Option<&Entry<T, Idx>> {
        self.get(&id)
    }

    #[inline]
    fn slot_mut(&mut self, id: Idx) -> Option<&mut Entry<T, Idx>> {
        self.get_mut(&id)
    }

    fn reserve_slot(&mut self, id: Idx) -> Result<(), RefError> {
        if self.contains_key(&id) {
            return Ok(());
        }
        self.try_reserve(1).map_err(|_| RefError::AllocationFailed)
    }

    #[inline]
    fn replace_slot(&mut self, id: Idx, entry: Entry<T, Idx>) -> Option<Entry<T, Idx>> {
        self.insert(id, entry)
    }
}
