//! Converting Resolution
//!
//! Picks the alternative a value converts into when it is handed to
//! `Variant::new` or `Variant::assign`.
//!
//! Candidates are examined in alternative order; alternative `i` is viable
//! when `T_i: From<T>`. Every viable candidate counts the same: an exact type
//! match is not ranked above a widening conversion.
//!
//! Resolution must be unique. The path marker `M` is inferred from the single
//! viable candidate; with zero or several viable candidates it cannot be
//! inferred and the call fails to compile:
//!
//! ```compile_fail
//! use tagged_variant::Variant;
//!
//! // i32 converts into both i64 and f64.
//! let v = Variant::<(i64, f64)>::new(5i32);
//! ```
//!
//! That includes a value whose own type is listed when another alternative
//! widens from it. `i64: From<i32>`, so `5i32` has two candidates here:
//!
//! ```compile_fail
//! use tagged_variant::Variant;
//!
//! let v = Variant::<(i32, i64)>::new(5i32);
//! ```
//!
//! Select the alternative explicitly instead:
//!
//! ```
//! use tagged_variant::Variant;
//!
//! let v = Variant::<(i32, i64)>::with_type::<i32, _>(5);
//! assert_eq!(v.index(), 0);
//! let w = Variant::<(i32, i64)>::with_index::<1>(5);
//! assert_eq!(w.index(), 1);
//! ```
//!
//! No viable candidate is rejected the same way:
//!
//! ```compile_fail
//! use tagged_variant::Variant;
//!
//! // Neither bool nor u8 is built from a string.
//! let v = Variant::<(bool, u8)>::new("text");
//! ```
//!
//! Type-directed access needs a unique position for `T`, so a list that
//! names `T` twice rejects `get_type` and `holds_alternative` for it:
//!
//! ```compile_fail
//! use tagged_variant::{Variant, get_type};
//!
//! let v = Variant::<(u8, u8)>::with_index::<0>(1);
//! let _ = get_type::<u8, _, _>(&v);
//! ```
//!
//! ```compile_fail
//! use tagged_variant::{Variant, holds_alternative};
//!
//! let v = Variant::<(u8, u8)>::with_index::<1>(1);
//! let _ = holds_alternative::<u8, _, _>(&v);
//! ```
//!
//! ```
//! use tagged_variant::Variant;
//!
//! let v = Variant::<(i64, f64)>::new(5i64);
//! assert_eq!(v.index(), 0);
//! let s = Variant::<(bool, String)>::new("text");
//! assert_eq!(s.index(), 1);
//! ```

use crate::alternatives::{Here, There};
use crate::storage::Layer;

/// Unique alternative of a layer chain that `T` converts into.
///
/// # Safety
/// `INDEX` must be the position of `Target` and `locate` must return its slot.
pub unsafe trait Resolve<T, M> {
    /// Alternative chosen for `T`.
    type Target;

    /// Position of `Target`.
    const INDEX: usize;

    /// Build the chosen alternative from the source value.
    fn convert(value: T) -> Self::Target;

    /// # Safety
    /// `this` must point into a live allocation of the chain.
    #[doc(hidden)]
    unsafe fn locate(this: *mut Self) -> *mut Self::Target;
}

unsafe impl<T, Head, Rest> Resolve<T, Here> for Layer<Head, Rest>
where
    Head: From<T>,
{
    type Target = Head;
    const INDEX: usize = 0;

    #[inline]
    fn convert(value: T) -> Head {
        Head::from(value)
    }

    #[inline(always)]
    unsafe fn locate(this: *mut Self) -> *mut Head {
        unsafe { Self::head_mut(this) }
    }
}

unsafe impl<T, Head, Rest, M> Resolve<T, There<M>> for Layer<Head, Rest>
where
    Rest: Resolve<T, M>,
{
    type Target = Rest::Target;
    const INDEX: usize = 1 + Rest::INDEX;

    #[inline]
    fn convert(value: T) -> Self::Target {
        Rest::convert(value)
    }

    #[inline(always)]
    unsafe fn locate(this: *mut Self) -> *mut Self::Target {
        unsafe { Rest::locate(Self::tail_mut(this)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alternatives::Alternatives;

    fn resolved_index<L: Alternatives, T, M>(_value: T) -> usize
    where
        L::Union: Resolve<T, M>,
    {
        <L::Union as Resolve<T, M>>::INDEX
    }

    fn resolve<L: Alternatives, T, M>(value: T) -> <L::Union as Resolve<T, M>>::Target
    where
        L::Union: Resolve<T, M>,
    {
        <L::Union as Resolve<T, M>>::convert(value)
    }

    #[derive(Debug, PartialEq)]
    struct Meters(u32);

    impl From<u16> for Meters {
        fn from(value: u16) -> Self {
            Meters(u32::from(value))
        }
    }

    #[test]
    fn test_exact_type_without_competing_conversion() {
        assert_eq!(resolved_index::<(i64, f64), _, _>(42.0f64), 1);
        assert_eq!(resolved_index::<(i64, f64), _, _>(5i64), 0);
    }

    #[test]
    fn test_conversion_to_unique_candidate() {
        assert_eq!(resolved_index::<(bool, String), _, _>("text"), 1);
        assert_eq!(resolved_index::<(String, Meters), _, _>(7u16), 1);
        assert_eq!(resolve::<(String, Meters), _, _>(7u16), Meters(7));
    }

    #[test]
    fn test_later_position_is_counted() {
        assert_eq!(resolved_index::<(u8, bool, char, Vec<u8>), _, _>('x'), 2);
        assert_eq!(
            resolved_index::<(u8, bool, char, Vec<u8>), _, _>(Vec::<u8>::new()),
            3
        );
    }

    #[test]
    fn test_widening_candidate_needs_explicit_selection() {
        use crate::variant::Variant;

        // i32 has two candidates in (i32, i64); only explicit selection works.
        let narrow = Variant::<(i32, i64)>::with_type::<i32, _>(5);
        let wide = Variant::<(i32, i64)>::with_type::<i64, _>(5);
        assert_eq!((narrow.index(), wide.index()), (0, 1));
        assert_eq!(narrow.get::<0>(), Ok(&5));
        assert_eq!(wide.get::<1>(), Ok(&5));

        // Without a competing widening the same value resolves on its own.
        assert_eq!(resolved_index::<(i32, String), _, _>(5i32), 0);
    }
}
