//! Alternative Lists
//!
//! A variant is parameterized by a tuple naming its alternatives in order:
//! `Variant<(i64, f64, String)>` holds one of `i64` (index 0), `f64`
//! (index 1) or `String` (index 2). This module maps such tuples onto the
//! layer chain of [`storage`](crate::storage) and answers the two
//! compile-time questions every accessor asks:
//!
//! - which type lives at index `I` ([`AlternativeAt`]), and
//! - at which index type `T` lives ([`IndexOf`]).
//!
//! `IndexOf` is found by walking the chain with the `Here` / `There<M>`
//! markers. If `T` appears more than once the walk has two answers, the
//! marker cannot be inferred, and the call is rejected at compile time
//! (see the examples in [`resolve`](crate::resolve)).

use std::marker::PhantomData;

use crate::storage::{Chain, Layer, Locate, Terminal};

/// A fixed, ordered list of alternative types.
///
/// Implemented for tuples of 1 to 12 types.
///
/// # Safety
/// `Union` must be the layer chain of the listed types, in order.
pub unsafe trait Alternatives: Sized {
    /// Layer chain holding the storage for every alternative.
    type Union: Chain;

    /// Number of alternatives.
    const LEN: usize = <Self::Union as Chain>::DEPTH;
}

/// Number of alternatives in `L`.
pub const fn variant_size<L: Alternatives>() -> usize {
    L::LEN
}

/// The alternative at position `I`.
///
/// Exists only for `I < L::LEN`, so an out-of-range index is a compile error.
pub trait AlternativeAt<const I: usize>: Alternatives {
    /// Type of alternative `I`.
    type Type;

    /// # Safety
    /// `union` must point into a live allocation of the chain.
    #[doc(hidden)]
    unsafe fn slot(union: *mut Self::Union) -> *mut Self::Type;
}

impl<L, const I: usize> AlternativeAt<I> for L
where
    L: Alternatives,
    L::Union: Locate<I>,
{
    type Type = <L::Union as Locate<I>>::Target;

    #[inline(always)]
    unsafe fn slot(union: *mut Self::Union) -> *mut Self::Type {
        unsafe { <L::Union as Locate<I>>::locate(union) }
    }
}

// =============================================================================
// Type Position
// =============================================================================

/// Marker: the searched type is this layer's alternative.
pub struct Here;

/// Marker: the searched type is further down the chain.
pub struct There<M>(PhantomData<M>);

/// Position of `T` in a layer chain.
///
/// `M` is a path marker and is always inferred; write `_` for it.
///
/// # Safety
/// `INDEX` must be the position of `T` and `locate` must return its slot.
pub unsafe trait IndexOf<T, M> {
    /// Position of `T`.
    const INDEX: usize;

    /// # Safety
    /// `this` must point into a live allocation of the chain.
    #[doc(hidden)]
    unsafe fn locate(this: *mut Self) -> *mut T;
}

unsafe impl<T, Rest> IndexOf<T, Here> for Layer<T, Rest> {
    const INDEX: usize = 0;

    #[inline(always)]
    unsafe fn locate(this: *mut Self) -> *mut T {
        unsafe { Self::head_mut(this) }
    }
}

unsafe impl<T, Head, Rest, M> IndexOf<T, There<M>> for Layer<Head, Rest>
where
    Rest: IndexOf<T, M>,
{
    const INDEX: usize = 1 + Rest::INDEX;

    #[inline(always)]
    unsafe fn locate(this: *mut Self) -> *mut T {
        unsafe { Rest::locate(Self::tail_mut(this)) }
    }
}

// =============================================================================
// Tuple Lists
// =============================================================================

macro_rules! layers {
    ($last:ident) => { Layer<$last, Terminal> };
    ($head:ident, $($rest:ident),+) => { Layer<$head, layers!($($rest),+)> };
}

macro_rules! alternative_list {
    ($($ty:ident),+) => {
        unsafe impl<$($ty),+> Alternatives for ($($ty,)+) {
            type Union = layers!($($ty),+);
        }
    };
}

alternative_list!(A);
alternative_list!(A, B);
alternative_list!(A, B, C);
alternative_list!(A, B, C, D);
alternative_list!(A, B, C, D, E);
alternative_list!(A, B, C, D, E, F);
alternative_list!(A, B, C, D, E, F, G);
alternative_list!(A, B, C, D, E, F, G, H);
alternative_list!(A, B, C, D, E, F, G, H, I);
alternative_list!(A, B, C, D, E, F, G, H, I, J);
alternative_list!(A, B, C, D, E, F, G, H, I, J, K);
alternative_list!(A, B, C, D, E, F, G, H, I, J, K, M);

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::TypeId;

    fn type_at<const I: usize, L: AlternativeAt<I>>() -> TypeId
    where
        <L as AlternativeAt<I>>::Type: 'static,
    {
        TypeId::of::<<L as AlternativeAt<I>>::Type>()
    }

    fn index_of<L: Alternatives, T, M>() -> usize
    where
        L::Union: IndexOf<T, M>,
    {
        <L::Union as IndexOf<T, M>>::INDEX
    }

    #[test]
    fn test_variant_size() {
        assert_eq!(variant_size::<(u8,)>(), 1);
        assert_eq!(variant_size::<(u8, u16, u32, u64)>(), 4);
        assert_eq!(
            variant_size::<(u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8)>(),
            12
        );
    }

    #[test]
    fn test_alternative_at_follows_tuple_order() {
        assert_eq!(type_at::<0, (i64, f64, String)>(), TypeId::of::<i64>());
        assert_eq!(type_at::<1, (i64, f64, String)>(), TypeId::of::<f64>());
        assert_eq!(type_at::<2, (i64, f64, String)>(), TypeId::of::<String>());
    }

    #[test]
    fn test_index_of_unique_types() {
        assert_eq!(index_of::<(i64, f64, String), i64, _>(), 0);
        assert_eq!(index_of::<(i64, f64, String), f64, _>(), 1);
        assert_eq!(index_of::<(i64, f64, String), String, _>(), 2);
    }
}
