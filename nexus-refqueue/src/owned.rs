//! RefQueue - a ring queue that owns its value table.

use core::fmt;

use nexus_refs::{Rejected, SlotIndex, VecStore};

use crate::{Iter, QueueError, RingQueue};

/// FIFO queue of optional values that owns its storage.
///
/// This is the object a host exposes to its callers: a [`RingQueue`] bundled
/// with the [`VecStore`] its identifiers point into, so the table lives and
/// dies with the queue. Use [`RingQueue`] directly when the host already
/// keeps its own value table.
///
/// `None` is a first-class element (an absent value). `pop` distinguishes it
/// from an empty queue:
///
/// ```
/// use nexus_refqueue::RefQueue;
///
/// let mut queue: RefQueue<&str> = RefQueue::new();
///
/// queue.push(Some("a")).unwrap();
/// queue.push(None).unwrap();
///
/// assert_eq!(queue.get(0), Ok(Some(&"a")));
/// assert!(queue.get(2).is_err());
///
/// assert_eq!(queue.pop(), Some(Some("a")));
/// assert_eq!(queue.pop(), Some(None));
/// assert_eq!(queue.pop(), None);
/// ```
pub struct RefQueue<T, Idx: SlotIndex = u32> {
    ring: RingQueue<Idx>,
    store: VecStore<T, Idx>,
}

impl<T, Idx: SlotIndex> RefQueue<T, Idx> {
    /// Creates an empty queue with the minimum capacity.
    pub fn new() -> Self {
        Self::from_parts(RingQueue::new(), VecStore::new())
    }

    /// Creates an empty queue with room for `capacity - 1` elements before
    /// growing.
    ///
    /// # Panics
    ///
    /// Panics if the ring or the value table cannot be allocated. See
    /// [`QueueBuilder::build`](crate::QueueBuilder::build) for the fallible
    /// form.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_parts(RingQueue::with_capacity(capacity), VecStore::with_capacity(capacity))
    }

    pub(crate) fn from_parts(ring: RingQueue<Idx>, store: VecStore<T, Idx>) -> Self {
        Self { ring, store }
    }

    /// Number of queued elements, absent values included.
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` if nothing is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Ring capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Highest slot identifier ever handed out for this queue.
    #[inline]
    pub fn max_allocated(&self) -> usize {
        self.ring.allocator().max_allocated()
    }

    /// Appends `value` at the back. `None` queues an absent value.
    ///
    /// # Errors
    ///
    /// Returns the value inside [`Rejected`] if memory or identifiers run out.
    #[inline]
    pub fn push(&mut self, value: Option<T>) -> Result<(), Rejected<Option<T>>> {
        self.ring.push(&mut self.store, value)
    }

    /// Removes the front element.
    ///
    /// `None` if empty, `Some(None)` for an absent value.
    #[inline]
    pub fn pop(&mut self) -> Option<Option<T>> {
        self.ring.pop(&mut self.store)
    }

    /// Returns the element at `index` (0 is the front).
    ///
    /// Takes a signed index as handed over by a host binding.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::OutOfRange`] for a negative index or one at or
    /// past `len`.
    pub fn get(&self, index: i64) -> Result<Option<&T>, QueueError> {
        let Ok(offset) = usize::try_from(index) else {
            return Err(QueueError::OutOfRange {
                index,
                len: self.len(),
            });
        };
        self.ring.peek_at(&self.store, offset)
    }

    /// Returns the front element, or `None` if the queue is empty.
    #[inline]
    pub fn front(&self) -> Option<Option<&T>> {
        self.ring.front(&self.store)
    }

    /// Iterates front to back.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, Idx, VecStore<T, Idx>> {
        self.ring.iter(&self.store)
    }

    /// Copies the queue out, front to back.
    pub fn to_vec(&self) -> Vec<Option<T>>
    where
        T: Clone,
    {
        self.ring.to_vec(&self.store)
    }

    /// Removes every element. Capacity is kept.
    pub fn clear(&mut self) {
        self.ring.clear(&mut self.store);
    }
}

impl<T, Idx: SlotIndex> Default for RefQueue<T, Idx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, Idx: SlotIndex> fmt::Debug for RefQueue<T, Idx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, Idx: SlotIndex> fmt::Display for RefQueue<T, Idx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue(len={}, cap={})", self.len(), self.capacity())
    }
}

impl<T, Idx: SlotIndex> Extend<Option<T>> for RefQueue<T, Idx> {
    /// # Panics
    ///
    /// Panics if memory or identifiers run out, like `Vec::extend`.
    fn extend<I: IntoIterator<Item = Option<T>>>(&mut self, iter: I) {
        for value in iter {
            if let Err(rejected) = self.push(value) {
                panic!("queue extend failed: {}", rejected.error);
            }
        }
    }
}

impl<T, Idx: SlotIndex> FromIterator<Option<T>> for RefQueue<T, Idx> {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}

impl<'a, T, Idx: SlotIndex> IntoIterator for &'a RefQueue<T, Idx> {
    type Item = Option<&'a T>;
    type IntoIter = Iter<'a, T, Idx, VecStore<T, Idx>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
