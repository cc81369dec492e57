//! Slot identifier trait.
//!
//! Identifiers are plain unsigned integers with two reserved values:
//! `FREE_HEAD` (`0`), the cell that anchors the free list, and `NIL`
//! (`MAX`), the marker queued in place of an absent value.

/// An unsigned integer usable as a slot identifier.
///
/// # Example
///
/// ```
/// use nexus_refs::SlotIndex;
///
/// let id: u32 = 5;
///
/// assert!(id.is_live());
/// assert!(u32::NIL.is_nil());
/// assert!(!u32::FREE_HEAD.is_live());
/// ```
pub trait SlotIndex: Copy + Eq + core::hash::Hash + core::fmt::Debug + 'static {
    /// Sentinel for an absent value. Never stored in a [`ValueStore`](crate::ValueStore).
    const NIL: Self;

    /// Reserved cell holding the free-list head. Also terminates the chain.
    const FREE_HEAD: Self;

    /// Returns the identifier as a `usize`.
    fn as_usize(self) -> usize;

    /// Creates an identifier from a `usize`.
    fn from_usize(val: usize) -> Self;

    /// Returns `true` if this is the absent-value sentinel.
    #[inline]
    fn is_nil(self) -> bool {
        self == Self::NIL
    }

    /// Returns `true` if this identifier can name a stored value.
    #[inline]
    fn is_live(self) -> bool {
        self != Self::NIL && self != Self::FREE_HEAD
    }
}

macro_rules! impl_slot_index_for_unsigned {
    ($($ty:ty),*) => {
        $(
            impl SlotIndex for $ty {
                const NIL: Self = <$ty>::MAX;
                const FREE_HEAD: Self = 0;

                #[inline]
                fn as_usize(self) -> usize {
                    self as usize
                }

                #[inline]
                fn from_usize(val: usize) -> Self {
                    val as Self
                }
            }
        )*
    };
}

impl_slot_index_for_unsigned!(u16, u32, u64, usize);
