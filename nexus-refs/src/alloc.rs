//! Free-list slot allocator.
//!
//! Hands out identifiers for values written into a [`ValueStore`] and
//! recycles released ones. Free identifiers are chained through their own
//! store cells (`Entry::Vacant { next_free }`), with the chain head kept in
//! cell `FREE_HEAD`. Reuse is LIFO: the most recently released identifier is
//! the next one handed out. Fresh identifiers come from a counter that only
//! moves forward.

use core::marker::PhantomData;

use tracing::debug;

use crate::{Entry, RefError, Rejected, SlotIndex, ValueStore};

/// Assigns and recycles slot identifiers over an external [`ValueStore`].
///
/// The allocator holds only the high-water mark and a live count; the free
/// list lives in the store. An allocator must always be used with the same
/// store instance. Passing a different store corrupts both (same discipline
/// as the `slab` crate).
///
/// # Example
///
/// ```
/// use nexus_refs::{SlotAllocator, VecStore};
///
/// let mut store: VecStore<String> = VecStore::new();
/// let mut alloc = SlotAllocator::new();
///
/// let a = alloc.acquire(&mut store, Some("a".to_string())).unwrap();
/// let b = alloc.acquire(&mut store, Some("b".to_string())).unwrap();
/// assert_eq!((a, b), (1, 2));
///
/// // Released identifiers are reused before the counter advances
/// assert_eq!(alloc.release(&mut store, a).as_deref(), Some("a"));
/// let c = alloc.acquire(&mut store, Some("c".to_string())).unwrap();
/// assert_eq!(c, a);
/// assert_eq!(alloc.max_allocated(), 2);
///
/// // Absent values never consume an identifier
/// let nil = alloc.acquire(&mut store, None).unwrap();
/// assert_eq!(nil, u32::MAX);
/// assert_eq!(alloc.max_allocated(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SlotAllocator<Idx: SlotIndex = u32> {
    /// Highest identifier ever handed out. Never decreases.
    max_allocated: usize,
    /// Identifiers currently holding a value.
    live: usize,
    _marker: PhantomData<Idx>,
}

impl<Idx: SlotIndex> SlotAllocator<Idx> {
    /// Creates an allocator that has handed out nothing.
    pub const fn new() -> Self {
        Self {
            max_allocated: 0,
            live: 0,
            _marker: PhantomData,
        }
    }

    /// Highest identifier ever allocated.
    #[inline]
    pub const fn max_allocated(&self) -> usize {
        self.max_allocated
    }

    /// Number of identifiers currently holding a value.
    #[inline]
    pub const fn live(&self) -> usize {
        self.live
    }

    /// Stores `value` and returns its identifier.
    ///
    /// `None` is the absent value: it returns `Idx::NIL` without touching the
    /// store or consuming an identifier.
    ///
    /// # Errors
    ///
    /// - [`RefError::Exhausted`] if the free list is empty and the next fresh
    ///   identifier would collide with `NIL`.
    /// - [`RefError::AllocationFailed`] if the store cannot grow.
    ///
    /// Either way the value is handed back and the allocator is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the free list is corrupt (a chained identifier holds a value).
    pub fn acquire<T, S>(&mut self, store: &mut S, value: Option<T>) -> Result<Idx, Rejected<T>>
    where
        S: ValueStore<T, Index = Idx>,
    {
        let Some(value) = value else {
            return Ok(Idx::NIL);
        };

        // Reuse path: unlink the head of the free list
        let head = Self::free_head(store);
        if head != Idx::FREE_HEAD {
            let next = match store.slot(head) {
                Some(Entry::Vacant { next_free }) => *next_free,
                _ => panic!("free list corruption: slot {head:?} is not vacant"),
            };
            store.replace_slot(Idx::FREE_HEAD, Entry::Vacant { next_free: next });
            store.replace_slot(head, Entry::Occupied { value });
            self.live += 1;
            return Ok(head);
        }

        // Fresh path: advance the counter
        let next = self.max_allocated + 1;
        if next >= Idx::NIL.as_usize() {
            debug!(max = self.max_allocated, "slot identifiers exhausted");
            return Err(Rejected::new(
                value,
                RefError::Exhausted {
                    max: self.max_allocated,
                },
            ));
        }

        let id = Idx::from_usize(next);
        if let Err(error) = Self::ensure_head(store).and_then(|()| store.reserve_slot(id)) {
            debug!(id = next, %error, "value table could not grow");
            return Err(Rejected::new(value, error));
        }

        store.replace_slot(id, Entry::Occupied { value });
        self.max_allocated = next;
        self.live += 1;
        Ok(id)
    }

    /// Releases `id`, returning the value it held.
    ///
    /// The value is moved out of the cell in the same write that turns the
    /// cell into a free-list link, so nothing stored is lost. Releasing
    /// `Idx::NIL` is a no-op returning `None`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is `FREE_HEAD`, or does not currently hold a value
    /// (double release, or an identifier from another store).
    pub fn release<T, S>(&mut self, store: &mut S, id: Idx) -> Option<T>
    where
        S: ValueStore<T, Index = Idx>,
    {
        if id.is_nil() {
            return None;
        }
        assert!(id != Idx::FREE_HEAD, "releasing the free-list head");
        assert!(
            store.slot(id).is_some_and(Entry::is_occupied),
            "releasing vacant slot {id:?}"
        );

        let head = Self::free_head(store);
        let value = store
            .replace_slot(id, Entry::Vacant { next_free: head })
            .and_then(Entry::into_value);
        store.replace_slot(Idx::FREE_HEAD, Entry::Vacant { next_free: id });
        self.live -= 1;
        value
    }

    /// Returns the value held by `id`. `NIL` and `FREE_HEAD` resolve to `None`.
    #[inline]
    pub fn get<'a, T, S>(&self, store: &'a S, id: Idx) -> Option<&'a T>
    where
        S: ValueStore<T, Index = Idx>,
    {
        if !id.is_live() {
            return None;
        }
        store.slot(id).and_then(Entry::value)
    }

    /// Returns the value held by `id` mutably.
    #[inline]
    pub fn get_mut<'a, T, S>(&self, store: &'a mut S, id: Idx) -> Option<&'a mut T>
    where
        S: ValueStore<T, Index = Idx>,
    {
        if !id.is_live() {
            return None;
        }
        store.slot_mut(id).and_then(Entry::value_mut)
    }

    /// Counts identifiers on the free list by walking the chain.
    ///
    /// O(n) in the number of free identifiers. Intended for diagnostics.
    ///
    /// # Panics
    ///
    /// Panics if the chain is longer than `max_allocated` (a cycle).
    pub fn free_len<T, S>(&self, store: &S) -> usize
    where
        S: ValueStore<T, Index = Idx>,
    {
        let mut count = 0;
        let mut cursor = Self::free_head(store);
        while cursor != Idx::FREE_HEAD {
            count += 1;
            assert!(count <= self.max_allocated, "free list cycle");
            cursor = match store.slot(cursor) {
                Some(Entry::Vacant { next_free }) => *next_free,
                _ => panic!("free list corruption: slot {cursor:?} is not vacant"),
            };
        }
        count
    }

    /// Reads the free-list head. A store that has never been written has an
    /// empty list.
    #[inline]
    fn free_head<T, S>(store: &S) -> Idx
    where
        S: ValueStore<T, Index = Idx>,
    {
        match store.slot(Idx::FREE_HEAD) {
            None => Idx::FREE_HEAD,
            Some(Entry::Vacant { next_free }) => *next_free,
            Some(Entry::Occupied { .. }) => panic!("free list head holds a value"),
        }
    }

    /// Creates the head cell on first use so `release` never allocates.
    fn ensure_head<T, S>(store: &mut S) -> Result<(), RefError>
    where
        S: ValueStore<T, Index = Idx>,
    {
        if store.slot(Idx::FREE_HEAD).is_none() {
            store.reserve_slot(Idx::FREE_HEAD)?;
            store.replace_slot(Idx::FREE_HEAD, Entry::EMPTY);
        }
        Ok(())
    }
}

impl<Idx: SlotIndex> Default for SlotAllocator<Idx> {
    fn default() -> Self {
        Self::new()
    }
}
