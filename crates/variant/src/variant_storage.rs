//! Variant Storage
//!
//! Pairs the raw [`AlternativeStorage`] with the index of the live
//! alternative and owns the construct/destroy bookkeeping.
//!
//! ```text
//! ┌──────────────────────────────┬──────────────┐
//! │ AlternativeStorage<L>        │ index: usize │
//! │ (largest alternative, inline)│ 0..N or NPOS │
//! └──────────────────────────────┴──────────────┘
//! ```
//!
//! Invariants:
//! - `index == VARIANT_NPOS` exactly when no alternative is live.
//! - otherwise `index < L::LEN` and alternative `index` is live.
//!
//! Construction never destroys prior content; callers destroy first.
//! Destruction clears the index *before* dropping the old value, so a
//! panicking destructor can never be observed a second time by `Drop`.
//!
//! The same code serves lists with and without drop glue: when no
//! alternative needs dropping, `destroy_at` compiles to nothing.

use std::mem;

use crate::alternatives::{AlternativeAt, Alternatives, IndexOf};
use crate::error::VARIANT_NPOS;
use crate::resolve::Resolve;
use crate::storage::{AlternativeStorage, Locator};

/// Alternative storage plus the index of the live alternative.
pub(crate) struct VariantStorage<L: Alternatives> {
    value: AlternativeStorage<L>,
    index: usize,
}

impl<L: Alternatives> VariantStorage<L> {
    /// Storage holding nothing.
    pub(crate) const fn valueless() -> Self {
        VariantStorage {
            value: AlternativeStorage::uninit(),
            index: VARIANT_NPOS,
        }
    }

    #[inline(always)]
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    #[inline(always)]
    pub(crate) fn is_valueless(&self) -> bool {
        self.index == VARIANT_NPOS
    }

    #[inline(always)]
    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.value.as_ptr()
    }

    #[inline(always)]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.value.as_mut_ptr()
    }

    #[inline(always)]
    pub(crate) fn union_mut(&mut self) -> *mut L::Union {
        self.value.union_mut()
    }

    /// Record `index` as live after its slot was written through a raw pointer.
    ///
    /// # Safety
    /// The slot of alternative `index` must hold a fully constructed value and
    /// the storage must have been valueless before.
    pub(crate) unsafe fn assume_constructed(&mut self, index: usize) {
        debug_assert!(self.is_valueless(), "assume_constructed over a live alternative");
        debug_assert!(index < L::LEN, "alternative index {index} out of range");
        self.index = index;
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    fn construct_raw<T>(&mut self, index: usize, locate: Locator<L, T>, value: T) -> &mut T {
        debug_assert!(
            self.is_valueless(),
            "construct over live alternative {}",
            self.index
        );
        let slot = unsafe { self.value.construct_at(locate, value) };
        self.index = index;
        slot
    }

    /// Place `value` as alternative `I`.
    #[inline]
    pub(crate) fn construct_internal_value<const I: usize>(
        &mut self,
        value: <L as AlternativeAt<I>>::Type,
    ) -> &mut <L as AlternativeAt<I>>::Type
    where
        L: AlternativeAt<I>,
    {
        self.construct_raw(I, <L as AlternativeAt<I>>::slot, value)
    }

    /// Place `value` in the unique slot of type `T`.
    #[inline]
    pub(crate) fn construct_type<T, M>(&mut self, value: T) -> &mut T
    where
        L::Union: IndexOf<T, M>,
    {
        self.construct_raw(
            <L::Union as IndexOf<T, M>>::INDEX,
            <L::Union as IndexOf<T, M>>::locate,
            value,
        )
    }

    /// Place an already converted value in the slot chosen by resolution.
    #[inline]
    pub(crate) fn construct_resolved<T, M>(
        &mut self,
        value: <L::Union as Resolve<T, M>>::Target,
    ) -> &mut <L::Union as Resolve<T, M>>::Target
    where
        L::Union: Resolve<T, M>,
    {
        self.construct_raw(
            <L::Union as Resolve<T, M>>::INDEX,
            <L::Union as Resolve<T, M>>::locate,
            value,
        )
    }

    // -------------------------------------------------------------------------
    // Access
    // -------------------------------------------------------------------------

    /// # Safety
    /// Alternative `I` must be live.
    #[inline]
    pub(crate) unsafe fn get_unchecked<const I: usize>(&self) -> &<L as AlternativeAt<I>>::Type
    where
        L: AlternativeAt<I>,
    {
        debug_assert_eq!(self.index, I);
        unsafe { self.value.access_at(<L as AlternativeAt<I>>::slot) }
    }

    /// # Safety
    /// Alternative `I` must be live.
    #[inline]
    pub(crate) unsafe fn get_unchecked_mut<const I: usize>(
        &mut self,
    ) -> &mut <L as AlternativeAt<I>>::Type
    where
        L: AlternativeAt<I>,
    {
        debug_assert_eq!(self.index, I);
        unsafe { self.value.access_at_mut(<L as AlternativeAt<I>>::slot) }
    }

    /// # Safety
    /// The alternative of type `T` must be live.
    #[inline]
    pub(crate) unsafe fn get_type_unchecked<T, M>(&self) -> &T
    where
        L::Union: IndexOf<T, M>,
    {
        debug_assert_eq!(self.index, <L::Union as IndexOf<T, M>>::INDEX);
        unsafe { self.value.access_at(<L::Union as IndexOf<T, M>>::locate) }
    }

    /// # Safety
    /// The alternative of type `T` must be live.
    #[inline]
    pub(crate) unsafe fn get_type_unchecked_mut<T, M>(&mut self) -> &mut T
    where
        L::Union: IndexOf<T, M>,
    {
        debug_assert_eq!(self.index, <L::Union as IndexOf<T, M>>::INDEX);
        unsafe { self.value.access_at_mut(<L::Union as IndexOf<T, M>>::locate) }
    }

    /// # Safety
    /// The alternative chosen by resolving `T` must be live.
    #[inline]
    pub(crate) unsafe fn get_resolved_unchecked_mut<T, M>(
        &mut self,
    ) -> &mut <L::Union as Resolve<T, M>>::Target
    where
        L::Union: Resolve<T, M>,
    {
        debug_assert_eq!(self.index, <L::Union as Resolve<T, M>>::INDEX);
        unsafe { self.value.access_at_mut(<L::Union as Resolve<T, M>>::locate) }
    }

    /// Move alternative `I` out, leaving the storage valueless.
    ///
    /// # Safety
    /// Alternative `I` must be live.
    #[inline]
    pub(crate) unsafe fn take_unchecked<const I: usize>(&mut self) -> <L as AlternativeAt<I>>::Type
    where
        L: AlternativeAt<I>,
    {
        debug_assert_eq!(self.index, I);
        self.index = VARIANT_NPOS;
        unsafe { self.value.take_at(<L as AlternativeAt<I>>::slot) }
    }

    /// Move the alternative of type `T` out, leaving the storage valueless.
    ///
    /// # Safety
    /// The alternative of type `T` must be live.
    #[inline]
    pub(crate) unsafe fn take_type_unchecked<T, M>(&mut self) -> T
    where
        L::Union: IndexOf<T, M>,
    {
        debug_assert_eq!(self.index, <L::Union as IndexOf<T, M>>::INDEX);
        self.index = VARIANT_NPOS;
        unsafe { self.value.take_at(<L::Union as IndexOf<T, M>>::locate) }
    }

    // -------------------------------------------------------------------------
    // Destruction and exchange
    // -------------------------------------------------------------------------

    /// Drop the live alternative, if any, and leave the storage valueless.
    pub(crate) fn destroy_internal_value(&mut self) {
        let index = mem::replace(&mut self.index, VARIANT_NPOS);
        if index != VARIANT_NPOS {
            unsafe { self.value.destroy_at(index) }
        }
    }

    /// Exchange two storages holding the same live alternative, value by value.
    pub(crate) fn swap_same_alternative(&mut self, other: &mut Self) {
        debug_assert_eq!(self.index, other.index);
        if self.index != VARIANT_NPOS {
            unsafe { self.value.swap_at(&mut other.value, self.index) }
        }
        mem::swap(&mut self.index, &mut other.index);
    }
}

impl<L: Alternatives> Drop for VariantStorage<L> {
    fn drop(&mut self) {
        self.destroy_internal_value();
    }
}
