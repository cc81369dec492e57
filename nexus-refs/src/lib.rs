//! Reusable slot identifiers over host-owned value tables.
//!
//! A runtime that keeps values in its own table often needs compact integer
//! handles to them: something a queue or an index can store instead of the
//! value itself. This crate provides the allocator for those handles.
//!
//! ```text
//! ValueStore          - owns values, cell per identifier
//! SlotAllocator       - hands out identifiers, threads the free list
//!                       through released cells
//! ```
//!
//! # Identifier Layout
//!
//! ```text
//!   id:     0              1        2        3              4
//!        ┌────────────┐ ┌──────┐ ┌──────┐ ┌────────────┐ ┌────────────┐
//!        │ Vacant → 3 │ │ "a"  │ │ "b"  │ │ Vacant → 4 │ │ Vacant → 0 │
//!        └────────────┘ └──────┘ └──────┘ └────────────┘ └────────────┘
//!          free head                        free list: 3 -> 4 -> end
//! ```
//!
//! - `0` is reserved for the free-list head and is never handed out.
//! - `NIL` (`MAX`) stands for an absent value and is never stored.
//! - Released identifiers are reused (LIFO) before fresh ones are minted.
//!
//! # Example
//!
//! ```
//! use nexus_refs::{SlotAllocator, VecStore};
//!
//! let mut store: VecStore<&str> = VecStore::new();
//! let mut alloc = SlotAllocator::new();
//!
//! let id = alloc.acquire(&mut store, Some("order-1")).unwrap();
//! assert_eq!(alloc.get(&store, id), Some(&"order-1"));
//!
//! // Release moves the value out and recycles the identifier
//! assert_eq!(alloc.release(&mut store, id), Some("order-1"));
//! assert_eq!(alloc.acquire(&mut store, Some("order-2")).unwrap(), id);
//! ```

#![warn(missing_docs)]

pub mod alloc;
pub mod error;
pub mod index;
pub mod store;

pub use alloc::SlotAllocator;
pub use error::{RefError, Rejected};
pub use index::SlotIndex;
pub use store::{Entry, ValueStore, VecStore};
