//! Queue construction.

use nexus_refs::{SlotIndex, VecStore};

use crate::{MIN_CAPACITY, QueueError, RefQueue, RingQueue};

/// Builder for [`RefQueue`] and [`RingQueue`].
///
/// # Example
///
/// ```
/// use nexus_refqueue::{QueueBuilder, RefQueue};
///
/// let queue: RefQueue<u64> = QueueBuilder::default()
///     .capacity(1024)
///     .store_capacity(1024)
///     .build()
///     .unwrap();
///
/// assert_eq!(queue.capacity(), 1024);
/// ```
#[derive(Clone, Debug)]
pub struct QueueBuilder {
    capacity: usize,
    store_capacity: usize,
}

impl Default for QueueBuilder {
    fn default() -> Self {
        Self {
            capacity: MIN_CAPACITY,
            store_capacity: 0,
        }
    }
}

impl QueueBuilder {
    /// Initial ring capacity. Values below [`MIN_CAPACITY`] are raised to it.
    /// Default: [`MIN_CAPACITY`].
    pub fn capacity(mut self, slots: usize) -> Self {
        self.capacity = slots;
        self
    }

    /// Cells to pre-allocate in the owned value table. Only used by
    /// [`build`](Self::build). Default: 0 (grow on demand).
    pub fn store_capacity(mut self, values: usize) -> Self {
        self.store_capacity = values;
        self
    }

    /// Builds a ring for use with an external store.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Ref`] if the buffer cannot be allocated.
    pub fn build_ring<Idx: SlotIndex>(&self) -> Result<RingQueue<Idx>, QueueError> {
        RingQueue::try_with_capacity(self.capacity)
    }

    /// Builds a queue that owns its value table.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Ref`] if the buffer or table cannot be allocated.
    pub fn build<T, Idx: SlotIndex>(self) -> Result<RefQueue<T, Idx>, QueueError> {
        let ring = self.build_ring()?;
        let store = VecStore::try_with_capacity(self.store_capacity)?;
        Ok(RefQueue::from_parts(ring, store))
    }
}
