//! Growable ring of slot identifiers over external storage.
//!
//! The ring records FIFO order only. Values live in a [`ValueStore`] owned by
//! the caller; the ring holds the identifiers its [`SlotAllocator`] handed out
//! for them, plus `NIL` for absent values.
//!
//! # Layout
//!
//! ```text
//!            head                     tail
//!             │                        │
//!             ▼                        ▼
//!   ┌────┬────┬────┬────┬────┬────┬────┬────┐
//!   │    │    │ 3  │ 1  │NIL │ 2  │ 5  │    │   slots (identifiers)
//!   └────┴────┴────┴────┴────┴────┴────┴────┘
//!
//!   queue holds [head, tail) modulo capacity; one slot is always empty
//! ```
//!
//! # Growth
//!
//! When a push would fill the last free slot, capacity doubles. If the
//! occupied run wraps past the end, the segment `[head, cap)` moves to the top
//! of the enlarged buffer so the run stays contiguous modulo the new capacity:
//!
//! ```text
//!   before (cap 8, wrapped):   [ d e . . . a b c ]      head=5 tail=2
//!   after  (cap 16):           [ d e . . . . . . . . . . . a b c ]
//!                                                        head=13 tail=2
//! ```
//!
//! The new buffer is reserved before any index moves, and the ring only
//! switches to it once the store has accepted the value. A rejected push
//! leaves capacity, `head` and `tail` as they were.
//!
//! # Storage Invariant
//!
//! A ring must always be used with the same store instance, and a store must
//! back only one ring. Identifiers are only meaningful to the store they were
//! allocated in, and the fresh-identifier counter belongs to the ring.

use core::marker::PhantomData;

use nexus_refs::{RefError, Rejected, SlotAllocator, SlotIndex, ValueStore};
use tracing::debug;

use crate::QueueError;

/// Smallest capacity a ring is created with. Requests below are raised to it.
pub const MIN_CAPACITY: usize = 8;

/// FIFO ring of slot identifiers.
///
/// # Example
///
/// ```
/// use nexus_refs::VecStore;
/// use nexus_refqueue::RingQueue;
///
/// let mut store: VecStore<&str> = VecStore::new();
/// let mut ring: RingQueue = RingQueue::new();
///
/// ring.push(&mut store, Some("a")).unwrap();
/// ring.push(&mut store, None).unwrap();
/// ring.push(&mut store, Some("b")).unwrap();
///
/// assert_eq!(ring.len(), 3);
/// assert_eq!(ring.peek_at(&store, 2), Ok(Some(&"b")));
///
/// assert_eq!(ring.pop(&mut store), Some(Some("a")));
/// assert_eq!(ring.pop(&mut store), Some(None)); // absent value
/// assert_eq!(ring.pop(&mut store), Some(Some("b")));
/// assert_eq!(ring.pop(&mut store), None); // empty
/// ```
#[derive(Debug, Clone)]
pub struct RingQueue<Idx: SlotIndex = u32> {
    /// Identifier per position. `slots.len()` is the capacity.
    slots: Vec<Idx>,
    /// Position of the oldest element.
    head: usize,
    /// Position the next push writes to.
    tail: usize,
    alloc: SlotAllocator<Idx>,
}

impl<Idx: SlotIndex> RingQueue<Idx> {
    /// Creates an empty ring with [`MIN_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }

    /// Creates an empty ring with at least `capacity` positions.
    ///
    /// `capacity` below [`MIN_CAPACITY`] (including zero) is raised to it.
    ///
    /// # Panics
    ///
    /// Panics if the buffer cannot be allocated. See
    /// [`try_with_capacity`](Self::try_with_capacity).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_CAPACITY);
        Self {
            slots: vec![Idx::NIL; capacity],
            head: 0,
            tail: 0,
            alloc: SlotAllocator::new(),
        }
    }

    /// Fallible form of [`with_capacity`](Self::with_capacity).
    ///
    /// # Errors
    ///
    /// Returns [`RefError::AllocationFailed`] if the buffer cannot be
    /// allocated.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, QueueError> {
        let capacity = capacity.max(MIN_CAPACITY);
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| RefError::AllocationFailed)?;
        slots.resize(capacity, Idx::NIL);

        Ok(Self {
            slots,
            head: 0,
            tail: 0,
            alloc: SlotAllocator::new(),
        })
    }

    /// Number of queued elements, absent values included.
    #[inline]
    pub fn len(&self) -> usize {
        if self.tail >= self.head {
            self.tail - self.head
        } else {
            self.capacity() - (self.head - self.tail)
        }
    }

    /// Returns `true` if nothing is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Number of positions in the buffer. At most `capacity - 1` are usable
    /// before the next push grows it.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The allocator that owns this ring's identifiers.
    #[inline]
    pub fn allocator(&self) -> &SlotAllocator<Idx> {
        &self.alloc
    }

    /// Appends `value` at the back. `None` queues an absent value.
    ///
    /// # Errors
    ///
    /// Returns the value inside [`Rejected`] if the ring cannot grow or the
    /// store cannot take it. The queue is unchanged in that case.
    pub fn push<T, S>(&mut self, store: &mut S, value: Option<T>) -> Result<(), Rejected<Option<T>>>
    where
        S: ValueStore<T, Index = Idx>,
    {
        // Reserve the larger buffer first, but only switch to it once the
        // store has taken the value
        let grow_to = if self.len() + 1 >= self.capacity() {
            match self.reserve_growth() {
                Ok(new_cap) => Some(new_cap),
                Err(error) => return Err(Rejected::new(value, error)),
            }
        } else {
            None
        };

        let id = self.alloc.acquire(store, value).map_err(|r| r.map(Some))?;
        if let Some(new_cap) = grow_to {
            self.commit_growth(new_cap);
        }
        self.slots[self.tail] = id;
        self.tail = (self.tail + 1) % self.capacity();
        Ok(())
    }

    /// Removes the front element.
    ///
    /// Returns `None` if the queue is empty, `Some(None)` for an absent value,
    /// `Some(Some(value))` otherwise. The value's identifier goes back to the
    /// free list.
    pub fn pop<T, S>(&mut self, store: &mut S) -> Option<Option<T>>
    where
        S: ValueStore<T, Index = Idx>,
    {
        if self.is_empty() {
            return None;
        }

        let id = self.slots[self.head];
        self.head = (self.head + 1) % self.capacity();
        Some(self.alloc.release(store, id))
    }

    /// Returns the element `index` positions from the front, without removing
    /// it. `Ok(None)` is a queued absent value.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::OutOfRange`] unless `index < len`.
    pub fn peek_at<'a, T, S>(&self, store: &'a S, index: usize) -> Result<Option<&'a T>, QueueError>
    where
        S: ValueStore<T, Index = Idx>,
    {
        let len = self.len();
        if index >= len {
            return Err(QueueError::out_of_range(index, len));
        }
        Ok(self.resolve(store, self.physical(index)))
    }

    /// Returns the front element, or `None` if the queue is empty.
    #[inline]
    pub fn front<'a, T, S>(&self, store: &'a S) -> Option<Option<&'a T>>
    where
        S: ValueStore<T, Index = Idx>,
    {
        if self.is_empty() {
            return None;
        }
        Some(self.resolve(store, self.head))
    }

    /// Iterates front to back without removing anything.
    #[inline]
    pub fn iter<'a, T, S>(&'a self, store: &'a S) -> Iter<'a, T, Idx, S>
    where
        S: ValueStore<T, Index = Idx>,
    {
        Iter {
            ring: self,
            store,
            offset: 0,
            remaining: self.len(),
            _marker: PhantomData,
        }
    }

    /// Copies the queue out, front to back.
    pub fn to_vec<T, S>(&self, store: &S) -> Vec<Option<T>>
    where
        T: Clone,
        S: ValueStore<T, Index = Idx>,
    {
        self.iter(store).map(|v| v.cloned()).collect()
    }

    /// Removes every element, dropping the values and recycling their
    /// identifiers. Capacity is kept.
    pub fn clear<T, S>(&mut self, store: &mut S)
    where
        S: ValueStore<T, Index = Idx>,
    {
        while self.pop(store).is_some() {}
        self.head = 0;
        self.tail = 0;
    }

    #[inline]
    fn physical(&self, offset: usize) -> usize {
        (self.head + offset) % self.capacity()
    }

    #[inline]
    fn resolve<'a, T, S>(&self, store: &'a S, pos: usize) -> Option<&'a T>
    where
        S: ValueStore<T, Index = Idx>,
    {
        self.alloc.get(store, self.slots[pos])
    }

    /// Reserves room to double capacity without changing the ring.
    fn reserve_growth(&mut self) -> Result<usize, RefError> {
        let cap = self.capacity();
        let new_cap = cap.checked_mul(2).ok_or(RefError::AllocationFailed)?;

        if let Err(e) = self.slots.try_reserve_exact(new_cap - cap) {
            debug!(from = cap, to = new_cap, error = %e, "ring growth failed");
            return Err(RefError::AllocationFailed);
        }
        Ok(new_cap)
    }

    /// Doubles capacity into space from [`reserve_growth`](Self::reserve_growth),
    /// keeping the occupied run in order.
    fn commit_growth(&mut self, new_cap: usize) {
        let cap = self.capacity();
        self.slots.resize(new_cap, Idx::NIL);

        let wrapped = self.tail < self.head;
        if wrapped {
            let count = cap - self.head;
            let new_head = new_cap - count;
            self.slots.copy_within(self.head..cap, new_head);
            self.head = new_head;
        }

        debug!(from = cap, to = new_cap, wrapped, len = self.len(), "ring grew");
    }
}

impl<Idx: SlotIndex> Default for RingQueue<Idx> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Iterator
// =============================================================================

/// Front-to-back iterator over a [`RingQueue`].
///
/// Yields `Some(&T)` for values and `None` for queued absent values.
pub struct Iter<'a, T, Idx: SlotIndex, S> {
    ring: &'a RingQueue<Idx>,
    store: &'a S,
    offset: usize,
    remaining: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T: 'a, Idx, S> Iterator for Iter<'a, T, Idx, S>
where
    Idx: SlotIndex,
    S: ValueStore<T, Index = Idx>,
{
    type Item = Option<&'a T>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let pos = self.ring.physical(self.offset);
        self.offset += 1;
        self.remaining -= 1;
        Some(self.ring.resolve(self.store, pos))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: 'a, Idx, S> ExactSizeIterator for Iter<'a, T, Idx, S>
where
    Idx: SlotIndex,
    S: ValueStore<T, Index = Idx>,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_refs::VecStore;

    fn drain<S: ValueStore<u64, Index = u32>>(ring: &mut RingQueue, store: &mut S) -> Vec<Option<u64>> {
        let mut out = Vec::new();
        while let Some(v) = ring.pop(store) {
            out.push(v);
        }
        out
    }

    #[test]
    fn new_is_empty() {
        let ring: RingQueue = RingQueue::new();
        assert!(ring.is_empty());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.capacity(), MIN_CAPACITY);
    }

    #[test]
    fn small_capacity_is_raised() {
        let ring: RingQueue = RingQueue::with_capacity(0);
        assert_eq!(ring.capacity(), MIN_CAPACITY);

        let ring: RingQueue = RingQueue::try_with_capacity(3).unwrap();
        assert_eq!(ring.capacity(), MIN_CAPACITY);

        let ring: RingQueue = RingQueue::with_capacity(100);
        assert_eq!(ring.capacity(), 100);
    }

    #[test]
    fn push_pop_fifo() {
        let mut store: VecStore<u64> = VecStore::new();
        let mut ring: RingQueue = RingQueue::new();

        for i in 0..5 {
            ring.push(&mut store, Some(i)).unwrap();
        }
        assert_eq!(ring.len(), 5);
        assert_eq!(drain(&mut ring, &mut store), (0..5).map(Some).collect::<Vec<_>>());
        assert_eq!(ring.pop(&mut store), None);
    }

    #[test]
    fn pop_empty_is_none() {
        let mut store: VecStore<u64> = VecStore::new();
        let mut ring: RingQueue = RingQueue::new();
        assert_eq!(ring.pop(&mut store), None);
        assert_eq!(ring.len(), 0);
    }

    #[test]
    fn absent_values_round_trip() {
        let mut store: VecStore<u64> = VecStore::new();
        let mut ring: RingQueue = RingQueue::new();

        ring.push(&mut store, None).unwrap();
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.allocator().max_allocated(), 0);
        assert_eq!(ring.peek_at(&store, 0), Ok(None));

        assert_eq!(ring.pop(&mut store), Some(None));
        assert_eq!(ring.allocator().max_allocated(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn grows_when_one_slot_left() {
        let mut store: VecStore<u64> = VecStore::new();
        let mut ring: RingQueue = RingQueue::new();

        for i in 0..7 {
            ring.push(&mut store, Some(i)).unwrap();
        }
        assert_eq!(ring.capacity(), 8);

        ring.push(&mut store, Some(7)).unwrap();
        assert_eq!(ring.capacity(), 16);
        assert_eq!(ring.len(), 8);
        assert_eq!(drain(&mut ring, &mut store), (0..8).map(Some).collect::<Vec<_>>());
    }

    #[test]
    fn grow_while_wrapped_moves_head_segment() {
        let mut store: VecStore<u64> = VecStore::new();
        let mut ring: RingQueue = RingQueue::new();

        // Advance head to 5
        for i in 0..5 {
            ring.push(&mut store, Some(i)).unwrap();
        }
        for _ in 0..5 {
            ring.pop(&mut store);
        }
        assert_eq!((ring.head, ring.tail), (5, 5));

        // Fill to 7, wrapping: positions 5,6,7,0,1,2,3
        for i in 5..12 {
            ring.push(&mut store, Some(i)).unwrap();
        }
        assert_eq!((ring.head, ring.tail), (5, 4));
        assert_eq!(ring.capacity(), 8);

        // Next push grows: [5, 8) moves to [13, 16)
        ring.push(&mut store, Some(12)).unwrap();
        assert_eq!(ring.capacity(), 16);
        assert_eq!((ring.head, ring.tail), (13, 5));

        assert_eq!(
            ring.to_vec(&store),
            (5..13).map(Some).collect::<Vec<_>>()
        );
        assert_eq!(drain(&mut ring, &mut store), (5..13).map(Some).collect::<Vec<_>>());
    }

    #[test]
    fn grow_unwrapped_keeps_indices() {
        let mut store: VecStore<u64> = VecStore::new();
        let mut ring: RingQueue = RingQueue::new();

        for i in 0..8 {
            ring.push(&mut store, Some(i)).unwrap();
        }
        assert_eq!((ring.head, ring.tail), (0, 8));
        assert_eq!(ring.capacity(), 16);
    }

    #[test]
    fn grow_with_tail_at_zero() {
        let mut store: VecStore<u64> = VecStore::new();
        let mut ring: RingQueue = RingQueue::new();

        ring.push(&mut store, Some(0)).unwrap();
        ring.pop(&mut store);
        for i in 1..8 {
            ring.push(&mut store, Some(i)).unwrap();
        }
        assert_eq!((ring.head, ring.tail), (1, 0));

        // Run [1, 8) counts as wrapped and moves to [9, 16)
        ring.push(&mut store, Some(8)).unwrap();
        assert_eq!((ring.head, ring.tail), (9, 1));
        assert_eq!(drain(&mut ring, &mut store), (1..9).map(Some).collect::<Vec<_>>());
    }

    #[test]
    fn peek_at_bounds_by_len_not_capacity() {
        let mut store: VecStore<u64> = VecStore::new();
        let mut ring: RingQueue = RingQueue::new();

        ring.push(&mut store, Some(10)).unwrap();
        ring.push(&mut store, Some(20)).unwrap();
        ring.pop(&mut store);

        assert_eq!(ring.peek_at(&store, 0), Ok(Some(&20)));
        assert_eq!(
            ring.peek_at(&store, 1),
            Err(QueueError::OutOfRange { index: 1, len: 1 })
        );
        // Stale position inside capacity is not exposed
        assert!(ring.peek_at(&store, 5).is_err());
    }

    #[test]
    fn peek_does_not_mutate() {
        let mut store: VecStore<u64> = VecStore::new();
        let mut ring: RingQueue = RingQueue::new();

        for i in 0..3 {
            ring.push(&mut store, Some(i)).unwrap();
        }
        assert_eq!(ring.front(&store), Some(Some(&0)));
        assert_eq!(ring.peek_at(&store, 2), Ok(Some(&2)));
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.allocator().live(), 3);
    }

    #[test]
    fn front_of_empty_is_none() {
        let store: VecStore<u64> = VecStore::new();
        let ring: RingQueue = RingQueue::new();
        assert_eq!(ring.front(&store), None);
    }

    #[test]
    fn iter_is_exact_size() {
        let mut store: VecStore<u64> = VecStore::new();
        let mut ring: RingQueue = RingQueue::new();

        ring.push(&mut store, Some(1)).unwrap();
        ring.push(&mut store, None).unwrap();
        ring.push(&mut store, Some(3)).unwrap();

        let iter = ring.iter(&store);
        assert_eq!(iter.len(), 3);
        let items: Vec<_> = iter.collect();
        assert_eq!(items, vec![Some(&1), None, Some(&3)]);
    }

    #[test]
    fn clear_recycles_identifiers() {
        let mut store: VecStore<u64> = VecStore::new();
        let mut ring: RingQueue = RingQueue::new();

        for i in 0..20 {
            ring.push(&mut store, Some(i)).unwrap();
        }
        let cap = ring.capacity();
        ring.clear(&mut store);

        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), cap);
        assert_eq!(ring.allocator().live(), 0);
        assert_eq!(ring.allocator().free_len(&store), 20);

        ring.push(&mut store, Some(99)).unwrap();
        assert_eq!(ring.allocator().max_allocated(), 20);
    }

    #[test]
    fn single_value_churn_reuses_one_identifier() {
        let mut store: VecStore<u64> = VecStore::new();
        let mut ring: RingQueue = RingQueue::new();

        for i in 0..10_000 {
            ring.push(&mut store, Some(i)).unwrap();
            assert_eq!(ring.pop(&mut store), Some(Some(i)));
        }
        assert_eq!(ring.allocator().max_allocated(), 1);
        assert_eq!(ring.capacity(), MIN_CAPACITY);
    }

    #[test]
    fn exhausted_identifiers_leave_queue_unchanged() {
        let mut store: VecStore<u8, u16> = VecStore::new();
        let mut ring: RingQueue<u16> = RingQueue::new();

        for _ in 1..u16::MAX {
            ring.push(&mut store, Some(1)).unwrap();
        }
        let len = ring.len();

        let err = ring.push(&mut store, Some(2)).unwrap_err();
        assert!(matches!(err.error, RefError::Exhausted { .. }));
        assert_eq!(err.into_inner(), Some(2));
        assert_eq!(ring.len(), len);

        // Absent values need no identifier
        ring.push(&mut store, None).unwrap();
        assert_eq!(ring.len(), len + 1);
    }

    /// Store that refuses identifiers above `limit`.
    struct CappedStore {
        inner: VecStore<u64>,
        limit: usize,
    }

    impl ValueStore<u64> for CappedStore {
        type Index = u32;

        fn slot(&self, id: u32) -> Option<&nexus_refs::Entry<u64>> {
            self.inner.slot(id)
        }

        fn slot_mut(&mut self, id: u32) -> Option<&mut nexus_refs::Entry<u64>> {
            self.inner.slot_mut(id)
        }

        fn reserve_slot(&mut self, id: u32) -> Result<(), RefError> {
            if id as usize > self.limit {
                return Err(RefError::AllocationFailed);
            }
            self.inner.reserve_slot(id)
        }

        fn replace_slot(
            &mut self,
            id: u32,
            entry: nexus_refs::Entry<u64>,
        ) -> Option<nexus_refs::Entry<u64>> {
            self.inner.replace_slot(id, entry)
        }
    }

    #[test]
    fn rejected_push_does_not_grow() {
        let mut store = CappedStore {
            inner: VecStore::new(),
            limit: 7,
        };
        let mut ring: RingQueue = RingQueue::new();

        // Wrap: head 3, then seven values leave tail at 2
        for i in 0..3 {
            ring.push(&mut store, Some(i)).unwrap();
            ring.pop(&mut store);
        }
        for i in 0..7 {
            ring.push(&mut store, Some(i)).unwrap();
        }
        assert_eq!((ring.head, ring.tail, ring.capacity()), (3, 2, 8));

        // Needs both a bigger ring and identifier 8
        let err = ring.push(&mut store, Some(99)).unwrap_err();
        assert_eq!(err.error, RefError::AllocationFailed);
        assert_eq!(err.into_inner(), Some(99));
        assert_eq!((ring.head, ring.tail, ring.capacity()), (3, 2, 8));
        assert_eq!(ring.allocator().max_allocated(), 7);

        store.limit = usize::MAX;
        ring.push(&mut store, Some(7)).unwrap();
        assert_eq!((ring.head, ring.tail, ring.capacity()), (11, 3, 16));
        assert_eq!(drain(&mut ring, &mut store), (0..8).map(Some).collect::<Vec<_>>());
    }

    #[test]
    fn hashmap_backed_ring() {
        use nexus_refs::Entry;
        use std::collections::HashMap;

        let mut store: HashMap<u32, Entry<String>> = HashMap::new();
        let mut ring: RingQueue = RingQueue::new();

        ring.push(&mut store, Some("x".to_string())).unwrap();
        ring.push(&mut store, Some("y".to_string())).unwrap();
        assert_eq!(ring.pop(&mut store), Some(Some("x".to_string())));
        assert_eq!(ring.peek_at(&store, 0), Ok(Some(&"y".to_string())));
    }
}
