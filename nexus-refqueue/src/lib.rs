//! FIFO queue of slot identifiers over an indirection table.
//!
//! The queue never stores values itself. It stores compact integer
//! identifiers handed out by a [`SlotAllocator`](nexus_refs::SlotAllocator),
//! and the values sit in a [`ValueStore`](nexus_refs::ValueStore) the host
//! owns. Identifier space and queue order are decoupled: positions in the
//! ring are recycled by the ring, identifiers by the allocator's free list.
//!
//! # Design
//!
//! ```text
//! ValueStore (host)    - owns values, one cell per identifier
//! SlotAllocator        - identifiers in, identifiers out, free list in cells
//! RingQueue            - growable circular buffer of identifiers
//! RefQueue             - RingQueue + its own VecStore, the host-facing object
//! ```
//!
//! - **Amortized O(1)** push and pop; capacity doubles, never shrinks
//! - **Order-preserving growth**: a wrapped run is relocated, not reordered
//! - **Absent values** (`None`) are queued without consuming an identifier
//! - **Bounded lookups**: indexing is checked against the queue length, never
//!   the buffer capacity
//!
//! # Quick Start
//!
//! ```
//! use nexus_refqueue::RefQueue;
//!
//! let mut queue: RefQueue<&str> = RefQueue::new();
//!
//! for v in ["a", "b", "c"] {
//!     queue.push(Some(v)).unwrap();
//! }
//! assert_eq!(queue.pop(), Some(Some("a")));
//!
//! for v in ["d", "e", "f", "g", "h"] {
//!     queue.push(Some(v)).unwrap();
//! }
//! for expected in ["b", "c", "d", "e"] {
//!     assert_eq!(queue.pop(), Some(Some(expected)));
//! }
//!
//! assert_eq!(queue.len(), 3);
//! assert_eq!(queue.to_vec(), vec![Some("f"), Some("g"), Some("h")]);
//! ```
//!
//! # External Storage
//!
//! Hosts that already keep a value table drive [`RingQueue`] directly and pass
//! the table into every call:
//!
//! ```
//! use std::collections::HashMap;
//! use nexus_refs::Entry;
//! use nexus_refqueue::RingQueue;
//!
//! let mut table: HashMap<u32, Entry<String>> = HashMap::new();
//! let mut ring: RingQueue = RingQueue::new();
//!
//! ring.push(&mut table, Some("job-1".to_string())).unwrap();
//! assert_eq!(ring.pop(&mut table), Some(Some("job-1".to_string())));
//! ```
//!
//! # Threading
//!
//! Single-threaded. Every mutation takes `&mut self`; share a queue across
//! threads behind a lock or keep it confined to one owner.

#![warn(missing_docs)]

pub mod builder;
pub mod error;
pub mod owned;
pub mod ring;

pub use builder::QueueBuilder;
pub use error::QueueError;
pub use owned::RefQueue;
pub use ring::{Iter, MIN_CAPACITY, RingQueue};
