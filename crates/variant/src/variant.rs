//! Variant
//!
//! The public closed-union type. A `Variant<(A, B, C)>` holds exactly one
//! value of type `A`, `B` or `C`, stored inline and sized to the largest.
//!
//! # States
//!
//! ```text
//!            new / with_index / Default
//!                      │
//!                      ▼
//!   assign, emplace ┌────────────┐  emplace_with closure panics,
//!   clone_from, swap│ Holding(i) │  or the old value's Drop panics
//!   ┌──────────────▶│            │─────────────────────┐
//!   │               └────────────┘                     ▼
//!   │                      ▲                     ┌───────────┐
//!   └──────────────────────┴─────────────────────│ Valueless │
//!        any successful construction             └───────────┘
//! ```
//!
//! # Panic Safety
//!
//! - A converting `assign` and a type-changing `clone_from` build the new
//!   value before touching the old one. If building panics, the variant
//!   keeps its previous value.
//! - `emplace_with` destroys first and then runs the constructor closure. If
//!   the closure panics, the variant is left valueless.
//! - Moves never fail, so a move or `swap` can never leave a variant
//!   valueless.

use std::mem;

use crate::alternatives::{AlternativeAt, Alternatives, IndexOf};
use crate::error::{BadAccess, Result, VARIANT_NPOS};
use crate::resolve::Resolve;
use crate::storage::{Chain, Layer, Terminal};
use crate::variant_storage::VariantStorage;

/// A value of exactly one of the types listed in `L`.
///
/// ```
/// use tagged_variant::Variant;
///
/// let mut v = Variant::<(i64, f64)>::new(42.0f64);
/// assert_eq!(v.index(), 1);
///
/// v.assign(5i64);
/// assert_eq!(v.index(), 0);
/// assert_eq!(v.get::<0>(), Ok(&5));
/// assert!(v.get::<1>().is_err());
/// ```
pub struct Variant<L: Alternatives> {
    pub(crate) storage: VariantStorage<L>,
}

impl<L: Alternatives> Variant<L> {
    /// Number of alternatives.
    pub const LEN: usize = L::LEN;

    /// Converting construction: `value` goes to the unique alternative that
    /// implements `From<T>`.
    pub fn new<T, M>(value: T) -> Self
    where
        L::Union: Resolve<T, M>,
    {
        let mut storage = VariantStorage::valueless();
        storage.construct_resolved::<T, M>(<L::Union as Resolve<T, M>>::convert(value));
        Variant { storage }
    }

    /// Construct alternative `I` from `value`.
    pub fn with_index<const I: usize>(value: <L as AlternativeAt<I>>::Type) -> Self
    where
        L: AlternativeAt<I>,
    {
        let mut storage = VariantStorage::valueless();
        storage.construct_internal_value::<I>(value);
        Variant { storage }
    }

    /// Construct alternative `I` from the value `f` returns.
    pub fn in_place<const I: usize, F>(f: F) -> Self
    where
        L: AlternativeAt<I>,
        F: FnOnce() -> <L as AlternativeAt<I>>::Type,
    {
        Self::with_index::<I>(f())
    }

    /// Construct the alternative whose type is `T`.
    pub fn with_type<T, M>(value: T) -> Self
    where
        L::Union: IndexOf<T, M>,
    {
        let mut storage = VariantStorage::valueless();
        storage.construct_type::<T, M>(value);
        Variant { storage }
    }

    /// Index of the live alternative, or [`VARIANT_NPOS`] when valueless.
    #[inline]
    pub fn index(&self) -> usize {
        self.storage.index()
    }

    /// True when no alternative is live.
    #[inline]
    pub fn is_valueless(&self) -> bool {
        self.storage.is_valueless()
    }

    /// True when the live alternative is the one of type `T`.
    #[inline]
    pub fn holds<T, M>(&self) -> bool
    where
        L::Union: IndexOf<T, M>,
    {
        self.storage.index() == <L::Union as IndexOf<T, M>>::INDEX
    }

    /// True when alternative `index` is live.
    #[inline]
    pub fn holds_index(&self, index: usize) -> bool {
        index < L::LEN && self.storage.index() == index
    }

    // -------------------------------------------------------------------------
    // Assignment
    // -------------------------------------------------------------------------

    /// Converting assignment.
    ///
    /// The new value is converted before the old one is touched. When the
    /// resolved alternative is already live the value is assigned in place;
    /// otherwise the old value is dropped and the converted one moved in.
    pub fn assign<T, M>(&mut self, value: T) -> &mut <L::Union as Resolve<T, M>>::Target
    where
        L::Union: Resolve<T, M>,
    {
        let index = <L::Union as Resolve<T, M>>::INDEX;
        let fresh = <L::Union as Resolve<T, M>>::convert(value);
        if self.storage.index() == index {
            let slot = unsafe { self.storage.get_resolved_unchecked_mut::<T, M>() };
            *slot = fresh;
            return slot;
        }

        diag!(trace, "assign: alternative {} -> {}", self.storage.index(), index);
        self.destroy_current(index);
        self.storage.construct_resolved::<T, M>(fresh)
    }

    /// Replace the whole variant, returning the previous one.
    pub fn replace(&mut self, other: Self) -> Self {
        mem::replace(self, other)
    }

    // -------------------------------------------------------------------------
    // Emplace
    // -------------------------------------------------------------------------

    /// Destroy the current value and construct alternative `I` from `value`.
    pub fn emplace<const I: usize>(
        &mut self,
        value: <L as AlternativeAt<I>>::Type,
    ) -> &mut <L as AlternativeAt<I>>::Type
    where
        L: AlternativeAt<I>,
    {
        self.emplace_with::<I, _>(|| value)
    }

    /// Destroy the current value, then construct alternative `I` from the
    /// value `f` returns.
    ///
    /// If `f` panics the variant is left valueless.
    pub fn emplace_with<const I: usize, F>(&mut self, f: F) -> &mut <L as AlternativeAt<I>>::Type
    where
        L: AlternativeAt<I>,
        F: FnOnce() -> <L as AlternativeAt<I>>::Type,
    {
        diag!(trace, "emplace: alternative {} -> {}", self.storage.index(), I);
        self.destroy_current(I);

        let notice = ValuelessNotice::arm("constructor", I);
        let value = f();
        notice.disarm();
        self.storage.construct_internal_value::<I>(value)
    }

    /// Destroy the current value and construct the alternative of type `T`.
    pub fn emplace_type<T, M>(&mut self, value: T) -> &mut T
    where
        L::Union: IndexOf<T, M>,
    {
        let index = <L::Union as IndexOf<T, M>>::INDEX;
        diag!(trace, "emplace: alternative {} -> {}", self.storage.index(), index);
        self.destroy_current(index);
        self.storage.construct_type::<T, M>(value)
    }

    // -------------------------------------------------------------------------
    // Swap and Consumption
    // -------------------------------------------------------------------------

    /// Exchange contents with `other`.
    ///
    /// With the same live alternative the two values are swapped in place;
    /// otherwise whole storages are shuffled through a temporary.
    pub fn swap(&mut self, other: &mut Self) {
        if self.storage.index() == other.storage.index() {
            self.storage.swap_same_alternative(&mut other.storage);
            return;
        }

        diag!(
            trace,
            "swap: shuffling alternatives {} and {}",
            self.storage.index(),
            other.storage.index()
        );
        let displaced = mem::replace(&mut self.storage, VariantStorage::valueless());
        self.storage = mem::replace(&mut other.storage, displaced);
    }

    /// Consume the variant and return alternative `I`.
    pub fn into_index<const I: usize>(self) -> Result<<L as AlternativeAt<I>>::Type>
    where
        L: AlternativeAt<I>,
    {
        let mut storage = self.storage;
        if storage.index() != I {
            return Err(BadAccess::mismatch(I, storage.index()));
        }
        Ok(unsafe { storage.take_unchecked::<I>() })
    }

    /// Consume the variant and return the alternative of type `T`.
    pub fn into_type<T, M>(self) -> Result<T>
    where
        L::Union: IndexOf<T, M>,
    {
        let index = <L::Union as IndexOf<T, M>>::INDEX;
        let mut storage = self.storage;
        if storage.index() != index {
            return Err(BadAccess::mismatch(index, storage.index()));
        }
        Ok(unsafe { storage.take_type_unchecked::<T, M>() })
    }

    /// Drop the live value ahead of constructing alternative `next`.
    fn destroy_current(&mut self, next: usize) {
        let notice = ValuelessNotice::arm("previous value's destructor", next);
        self.storage.destroy_internal_value();
        notice.disarm();
    }

    /// Move `fresh` in after dropping the current value.
    fn overwrite(&mut self, fresh: Self) {
        self.destroy_current(fresh.storage.index());
        self.storage = fresh.storage;
    }
}

/// Emits a diagnostic when the step it guards unwinds and the variant is
/// left valueless.
struct ValuelessNotice {
    #[cfg_attr(not(feature = "diagnostics"), allow(dead_code))]
    step: &'static str,
    #[cfg_attr(not(feature = "diagnostics"), allow(dead_code))]
    next: usize,
}

impl ValuelessNotice {
    #[inline(always)]
    fn arm(step: &'static str, next: usize) -> Self {
        ValuelessNotice { step, next }
    }

    #[inline(always)]
    fn disarm(self) {
        mem::forget(self);
    }
}

impl Drop for ValuelessNotice {
    fn drop(&mut self) {
        diag!(
            debug,
            "{} panicked while switching to alternative {}; variant is valueless",
            self.step,
            self.next
        );
    }
}

impl<L> Default for Variant<L>
where
    L: AlternativeAt<0>,
    <L as AlternativeAt<0>>::Type: Default,
{
    /// Holds a default alternative 0.
    fn default() -> Self {
        Self::with_index::<0>(Default::default())
    }
}

// =============================================================================
// Clone
// =============================================================================

/// Clone the live alternative of a chain, picked by run-time index.
///
/// # Safety
/// Same layout contract as [`Chain`].
#[doc(hidden)]
pub unsafe trait CloneChain: Chain {
    /// Write a clone of alternative `index` of `src` into the empty `dst`.
    ///
    /// # Safety
    /// `src` must hold a live alternative `index`; `dst` must hold none.
    unsafe fn clone_at(src: *const Self, dst: *mut Self, index: usize);

    /// `clone_from` between two live values of alternative `index`.
    ///
    /// # Safety
    /// Both chains must hold a live alternative `index`.
    unsafe fn clone_from_at(dst: *mut Self, src: *const Self, index: usize);
}

unsafe impl CloneChain for Terminal {
    unsafe fn clone_at(_src: *const Self, _dst: *mut Self, index: usize) {
        unreachable!("clone_at: alternative index {index} is past the last layer");
    }

    unsafe fn clone_from_at(_dst: *mut Self, _src: *const Self, index: usize) {
        unreachable!("clone_from_at: alternative index {index} is past the last layer");
    }
}

unsafe impl<T: Clone, Rest: CloneChain> CloneChain for Layer<T, Rest> {
    #[inline]
    unsafe fn clone_at(src: *const Self, dst: *mut Self, index: usize) {
        unsafe {
            if index == 0 {
                Self::head_mut(dst).write((*Self::head(src)).clone());
            } else {
                Rest::clone_at(Self::tail(src), Self::tail_mut(dst), index - 1);
            }
        }
    }

    #[inline]
    unsafe fn clone_from_at(dst: *mut Self, src: *const Self, index: usize) {
        unsafe {
            if index == 0 {
                (*Self::head_mut(dst)).clone_from(&*Self::head(src));
            } else {
                Rest::clone_from_at(Self::tail_mut(dst), Self::tail(src), index - 1);
            }
        }
    }
}

impl<L: Alternatives> Clone for Variant<L>
where
    L::Union: CloneChain,
{
    /// Clone the live alternative. A valueless source clones to a valueless
    /// variant.
    fn clone(&self) -> Self {
        let mut storage = VariantStorage::valueless();
        let index = self.storage.index();
        if index != VARIANT_NPOS {
            unsafe {
                <L::Union as CloneChain>::clone_at(
                    self.storage.as_ptr().cast(),
                    storage.union_mut(),
                    index,
                );
                storage.assume_constructed(index);
            }
        }
        Variant { storage }
    }

    /// Same live alternative: delegate to that alternative's `clone_from`.
    /// Otherwise the source is cloned first and only then is the old value
    /// dropped, so a panicking `Clone` leaves `self` untouched.
    fn clone_from(&mut self, source: &Self) {
        let index = source.storage.index();
        if self.storage.index() == index {
            if index != VARIANT_NPOS {
                unsafe {
                    <L::Union as CloneChain>::clone_from_at(
                        self.storage.union_mut(),
                        source.storage.as_ptr().cast(),
                        index,
                    );
                }
            }
            return;
        }

        let fresh = source.clone();
        diag!(trace, "clone_from: alternative {} -> {}", self.storage.index(), index);
        self.overwrite(fresh);
    }
}
