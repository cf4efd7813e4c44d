//! Alternative Storage
//!
//! Raw, untagged storage for exactly one of N alternatives. The storage knows
//! nothing about which alternative is live; that bookkeeping lives one level
//! up in `VariantStorage`.
//!
//! ## Layer Chain
//!
//! An alternative list `(A, B, C)` is laid out as a right-leaning chain of
//! unions, one layer per alternative:
//!
//! ```text
//! Layer<A, Layer<B, Layer<C, Terminal>>>
//!
//! ┌──────────────────────────────── Layer 0 ───────────────────────────────┐
//! │ head: A         │ tail: ┌──────────────── Layer 1 ─────────────────┐   │
//! │                 │       │ head: B  │ tail: ┌──── Layer 2 ─────┐    │   │
//! │                 │       │          │       │ head: C │ Terminal│    │   │
//! │                 │       │          │       └──────────────────┘    │   │
//! │                 │       └──────────────────────────────────────────┘   │
//! └────────────────────────────────────────────────────────────────────────┘
//!   offset 0 for every head
//! ```
//!
//! Every layer is a `#[repr(C)]` union, so every field of every layer starts
//! at offset 0. The whole chain is therefore sized to the largest alternative
//! and aligned to the strictest one, and a pointer to the chain is also a
//! pointer to any alternative's slot.
//!
//! ## Addressing
//!
//! - `Locate<I>` walks the chain at compile time: layer `I` is reached by
//!   taking the tail `I` times and then the head. An index past the last
//!   layer has no `Locate` impl and does not compile.
//! - `Chain::destroy_at` walks the chain at run time for the index stored in
//!   the variant. When no alternative needs dropping the walk is skipped.

use std::mem::{self, ManuallyDrop, MaybeUninit};
use std::ptr;

use crate::alternatives::Alternatives;

// =============================================================================
// Layers
// =============================================================================

/// One layer of the storage chain: the slot of one alternative overlapping
/// the storage of all following alternatives.
#[repr(C)]
pub union Layer<T, Rest> {
    head: ManuallyDrop<T>,
    tail: ManuallyDrop<Rest>,
}

/// End of the storage chain. Holds nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Terminal;

impl<T, Rest> Layer<T, Rest> {
    /// Slot of this layer's alternative.
    ///
    /// # Safety
    /// `this` must point into a live allocation of at least `size_of::<Self>()` bytes.
    #[inline(always)]
    pub(crate) unsafe fn head(this: *const Self) -> *const T {
        unsafe { ptr::addr_of!((*this).head) }.cast::<T>()
    }

    /// # Safety
    /// Same as [`Layer::head`].
    #[inline(always)]
    pub(crate) unsafe fn head_mut(this: *mut Self) -> *mut T {
        unsafe { ptr::addr_of_mut!((*this).head) }.cast::<T>()
    }

    /// Storage of the following layers.
    ///
    /// # Safety
    /// Same as [`Layer::head`].
    #[inline(always)]
    pub(crate) unsafe fn tail(this: *const Self) -> *const Rest {
        unsafe { ptr::addr_of!((*this).tail) }.cast::<Rest>()
    }

    /// # Safety
    /// Same as [`Layer::head`].
    #[inline(always)]
    pub(crate) unsafe fn tail_mut(this: *mut Self) -> *mut Rest {
        unsafe { ptr::addr_of_mut!((*this).tail) }.cast::<Rest>()
    }
}

// =============================================================================
// Runtime Walk
// =============================================================================

/// Operations that walk the chain for an index only known at run time.
///
/// # Safety
/// Implementors must uphold the layer layout described in the module docs:
/// `DEPTH` is the number of alternatives and index `i` addresses the `i`-th.
pub unsafe trait Chain: Sized {
    /// Number of alternatives in the chain.
    const DEPTH: usize;

    /// True if any alternative has drop glue.
    const NEEDS_DROP: bool;

    /// Drop the alternative at `index` in place.
    ///
    /// # Safety
    /// `this` must hold a live value of alternative `index`. The slot is
    /// uninitialized afterwards.
    unsafe fn destroy_at(this: *mut Self, index: usize);

    /// Exchange the values of alternative `index` held by `this` and `other`.
    ///
    /// # Safety
    /// Both chains must hold a live value of alternative `index` and must not
    /// overlap.
    unsafe fn swap_at(this: *mut Self, other: *mut Self, index: usize);
}

unsafe impl Chain for Terminal {
    const DEPTH: usize = 0;
    const NEEDS_DROP: bool = false;

    unsafe fn destroy_at(_this: *mut Self, index: usize) {
        unreachable!("destroy_at: alternative index {index} is past the last layer");
    }

    unsafe fn swap_at(_this: *mut Self, _other: *mut Self, index: usize) {
        unreachable!("swap_at: alternative index {index} is past the last layer");
    }
}

unsafe impl<T, Rest: Chain> Chain for Layer<T, Rest> {
    const DEPTH: usize = 1 + Rest::DEPTH;
    const NEEDS_DROP: bool = mem::needs_drop::<T>() || Rest::NEEDS_DROP;

    #[inline]
    unsafe fn destroy_at(this: *mut Self, index: usize) {
        unsafe {
            if index == 0 {
                ptr::drop_in_place(Self::head_mut(this));
            } else {
                Rest::destroy_at(Self::tail_mut(this), index - 1);
            }
        }
    }

    #[inline]
    unsafe fn swap_at(this: *mut Self, other: *mut Self, index: usize) {
        unsafe {
            if index == 0 {
                ptr::swap_nonoverlapping(Self::head_mut(this), Self::head_mut(other), 1);
            } else {
                Rest::swap_at(Self::tail_mut(this), Self::tail_mut(other), index - 1);
            }
        }
    }
}

// =============================================================================
// Compile-Time Addressing
// =============================================================================

/// Compile-time projection from a chain to the slot of alternative `I`.
///
/// # Safety
/// `locate` must return a pointer to a slot sized and aligned for `Target`
/// that lies inside the chain pointed to by `this`.
pub unsafe trait Locate<const I: usize> {
    /// Alternative stored at position `I`.
    type Target;

    /// # Safety
    /// `this` must point into a live allocation of the chain.
    unsafe fn locate(this: *mut Self) -> *mut Self::Target;
}

unsafe impl<T, Rest> Locate<0> for Layer<T, Rest> {
    type Target = T;

    #[inline(always)]
    unsafe fn locate(this: *mut Self) -> *mut T {
        unsafe { Self::head_mut(this) }
    }
}

macro_rules! locate_in_tail {
    ($($index:literal => $prev:literal),* $(,)?) => {
        $(
            unsafe impl<T, Rest: Locate<$prev>> Locate<$index> for Layer<T, Rest> {
                type Target = Rest::Target;

                #[inline(always)]
                unsafe fn locate(this: *mut Self) -> *mut Self::Target {
                    unsafe { Rest::locate(Self::tail_mut(this)) }
                }
            }
        )*
    };
}

locate_in_tail!(
    1 => 0, 2 => 1, 3 => 2, 4 => 3, 5 => 4, 6 => 5, 7 => 6, 8 => 7,
    9 => 8, 10 => 9, 11 => 10, 12 => 11, 13 => 12, 14 => 13, 15 => 14,
);

// =============================================================================
// AlternativeStorage
// =============================================================================

/// Projection from a chain to one typed slot, as produced by `Locate`,
/// `IndexOf` or `Resolve`.
pub(crate) type Locator<L, T> = unsafe fn(*mut <L as Alternatives>::Union) -> *mut T;

/// Uninitialized bytes for one alternative of `L`.
pub struct AlternativeStorage<L: Alternatives> {
    slots: MaybeUninit<L::Union>,
}

impl<L: Alternatives> AlternativeStorage<L> {
    /// Storage with no live alternative.
    pub(crate) const fn uninit() -> Self {
        AlternativeStorage {
            slots: MaybeUninit::uninit(),
        }
    }

    /// Base address shared by every alternative's slot.
    #[inline(always)]
    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.slots.as_ptr().cast::<u8>()
    }

    #[inline(always)]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.slots.as_mut_ptr().cast::<u8>()
    }

    #[inline(always)]
    pub(crate) fn union_mut(&mut self) -> *mut L::Union {
        self.slots.as_mut_ptr()
    }

    /// Write `value` into the slot found by `locate`.
    ///
    /// # Safety
    /// No alternative may be live; a live one would be overwritten without
    /// being dropped.
    #[inline]
    pub(crate) unsafe fn construct_at<T>(&mut self, locate: Locator<L, T>, value: T) -> &mut T {
        unsafe {
            let slot = locate(self.union_mut());
            slot.write(value);
            &mut *slot
        }
    }

    /// # Safety
    /// The alternative addressed by `locate` must be the live one.
    #[inline]
    pub(crate) unsafe fn access_at<T>(&self, locate: Locator<L, T>) -> &T {
        // Only the address is computed through the mutable pointer.
        unsafe { &*locate(self.slots.as_ptr().cast_mut()) }
    }

    /// # Safety
    /// The alternative addressed by `locate` must be the live one.
    #[inline]
    pub(crate) unsafe fn access_at_mut<T>(&mut self, locate: Locator<L, T>) -> &mut T {
        unsafe { &mut *locate(self.union_mut()) }
    }

    /// Move the live value out of the slot found by `locate`.
    ///
    /// # Safety
    /// The alternative addressed by `locate` must be the live one; the slot is
    /// uninitialized afterwards.
    #[inline]
    pub(crate) unsafe fn take_at<T>(&mut self, locate: Locator<L, T>) -> T {
        unsafe { locate(self.union_mut()).read() }
    }

    /// Drop the live alternative at `index`.
    ///
    /// # Safety
    /// `index` must be the live alternative.
    #[inline]
    pub(crate) unsafe fn destroy_at(&mut self, index: usize) {
        if <L::Union as Chain>::NEEDS_DROP {
            unsafe { <L::Union as Chain>::destroy_at(self.union_mut(), index) }
        }
    }

    /// # Safety
    /// Both storages must hold a live value of alternative `index`.
    #[inline]
    pub(crate) unsafe fn swap_at(&mut self, other: &mut Self, index: usize) {
        unsafe { <L::Union as Chain>::swap_at(self.union_mut(), other.union_mut(), index) }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::mem::{align_of, size_of};
    use std::rc::Rc;

    struct CountsDrops(Rc<Cell<usize>>);

    impl Drop for CountsDrops {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_chain_sized_to_largest_alternative() {
        type Chain3 = <(u8, [u64; 4], u16) as Alternatives>::Union;
        assert_eq!(size_of::<Chain3>(), size_of::<[u64; 4]>());
        assert_eq!(align_of::<Chain3>(), align_of::<u64>());
    }

    #[test]
    fn test_chain_depth() {
        assert_eq!(<<(u8,) as Alternatives>::Union as Chain>::DEPTH, 1);
        assert_eq!(<<(u8, u16, u32) as Alternatives>::Union as Chain>::DEPTH, 3);
    }

    #[test]
    fn test_needs_drop_only_with_drop_glue() {
        let plain = <<(u8, f64) as Alternatives>::Union as Chain>::NEEDS_DROP;
        let owning = <<(u8, String) as Alternatives>::Union as Chain>::NEEDS_DROP;
        assert_eq!((plain, owning), (false, true));
    }

    #[test]
    fn test_every_slot_starts_at_the_base() {
        let mut storage = AlternativeStorage::<(u8, u32, String)>::uninit();
        let base = storage.as_mut_ptr();
        unsafe {
            let union = storage.union_mut();
            assert_eq!(<_ as Locate<0>>::locate(union).cast::<u8>(), base);
            assert_eq!(<_ as Locate<1>>::locate(union).cast::<u8>(), base);
            assert_eq!(<_ as Locate<2>>::locate(union).cast::<u8>(), base);
        }
    }

    #[test]
    fn test_construct_access_destroy() {
        let drops = Rc::new(Cell::new(0));
        let mut storage = AlternativeStorage::<(u8, CountsDrops)>::uninit();
        let locate: Locator<(u8, CountsDrops), CountsDrops> =
            <<(u8, CountsDrops) as Alternatives>::Union as Locate<1>>::locate;
        unsafe {
            storage.construct_at(locate, CountsDrops(drops.clone()));
            assert_eq!(Rc::strong_count(&storage.access_at(locate).0), 2);
            storage.destroy_at(1);
        }
        assert_eq!(drops.get(), 1);
        assert_eq!(Rc::strong_count(&drops), 1);
    }

    #[test]
    fn test_swap_at_exchanges_values() {
        let locate: Locator<(u8, String), String> =
            <<(u8, String) as Alternatives>::Union as Locate<1>>::locate;
        let mut left = AlternativeStorage::<(u8, String)>::uninit();
        let mut right = AlternativeStorage::<(u8, String)>::uninit();
        unsafe {
            left.construct_at(locate, "left".to_string());
            right.construct_at(locate, "right".to_string());
            left.swap_at(&mut right, 1);
            assert_eq!(left.access_at(locate), "right");
            assert_eq!(right.access_at(locate), "left");
            left.destroy_at(1);
            right.destroy_at(1);
        }
    }
}
