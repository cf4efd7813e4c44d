//! Comparison, Hashing and Formatting
//!
//! Variants compare by `(index, value)`:
//!
//! - equal iff the same alternative is live and the values are equal, or
//!   both are valueless;
//! - ordered by index first, then by value; a valueless variant orders
//!   before every variant holding a value.
//!
//! Each trait is forwarded to the live alternative through a layer walk on
//! the run-time index, the same way `Chain::destroy_at` finds the value to
//! drop.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::alternatives::Alternatives;
use crate::storage::{Chain, Layer, Terminal};
use crate::variant::Variant;

macro_rules! past_the_end {
    ($op:literal, $index:expr) => {
        unreachable!(concat!($op, ": alternative index {} is past the last layer"), $index)
    };
}

/// # Safety
/// Same layout contract as [`Chain`].
#[doc(hidden)]
pub unsafe trait PartialEqChain: Chain {
    /// # Safety
    /// Both chains must hold a live alternative `index`.
    unsafe fn eq_at(a: *const Self, b: *const Self, index: usize) -> bool;
}

/// Marker: every alternative is `Eq`.
#[doc(hidden)]
pub unsafe trait EqChain: PartialEqChain {}

/// # Safety
/// Same layout contract as [`Chain`].
#[doc(hidden)]
pub unsafe trait PartialOrdChain: PartialEqChain {
    /// # Safety
    /// Both chains must hold a live alternative `index`.
    unsafe fn partial_cmp_at(a: *const Self, b: *const Self, index: usize) -> Option<Ordering>;
}

/// # Safety
/// Same layout contract as [`Chain`].
#[doc(hidden)]
pub unsafe trait OrdChain: PartialOrdChain + EqChain {
    /// # Safety
    /// Both chains must hold a live alternative `index`.
    unsafe fn cmp_at(a: *const Self, b: *const Self, index: usize) -> Ordering;
}

/// # Safety
/// Same layout contract as [`Chain`].
#[doc(hidden)]
pub unsafe trait HashChain: Chain {
    /// # Safety
    /// The chain must hold a live alternative `index`.
    unsafe fn hash_at<H: Hasher>(this: *const Self, index: usize, state: &mut H);
}

/// # Safety
/// Same layout contract as [`Chain`].
#[doc(hidden)]
pub unsafe trait DebugChain: Chain {
    /// # Safety
    /// The chain must hold a live alternative `index`.
    unsafe fn fmt_at(this: *const Self, index: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

// =============================================================================
// Terminal
// =============================================================================

unsafe impl PartialEqChain for Terminal {
    unsafe fn eq_at(_a: *const Self, _b: *const Self, index: usize) -> bool {
        past_the_end!("eq_at", index)
    }
}

unsafe impl EqChain for Terminal {}

unsafe impl PartialOrdChain for Terminal {
    unsafe fn partial_cmp_at(_a: *const Self, _b: *const Self, index: usize) -> Option<Ordering> {
        past_the_end!("partial_cmp_at", index)
    }
}

unsafe impl OrdChain for Terminal {
    unsafe fn cmp_at(_a: *const Self, _b: *const Self, index: usize) -> Ordering {
        past_the_end!("cmp_at", index)
    }
}

unsafe impl HashChain for Terminal {
    unsafe fn hash_at<H: Hasher>(_this: *const Self, index: usize, _state: &mut H) {
        past_the_end!("hash_at", index)
    }
}

unsafe impl DebugChain for Terminal {
    unsafe fn fmt_at(_this: *const Self, index: usize, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        past_the_end!("fmt_at", index)
    }
}

// =============================================================================
// Layers
// =============================================================================

unsafe impl<T: PartialEq, Rest: PartialEqChain> PartialEqChain for Layer<T, Rest> {
    #[inline]
    unsafe fn eq_at(a: *const Self, b: *const Self, index: usize) -> bool {
        unsafe {
            if index == 0 {
                *Self::head(a) == *Self::head(b)
            } else {
                Rest::eq_at(Self::tail(a), Self::tail(b), index - 1)
            }
        }
    }
}

unsafe impl<T: Eq, Rest: EqChain> EqChain for Layer<T, Rest> {}

unsafe impl<T: PartialOrd, Rest: PartialOrdChain> PartialOrdChain for Layer<T, Rest> {
    #[inline]
    unsafe fn partial_cmp_at(a: *const Self, b: *const Self, index: usize) -> Option<Ordering> {
        unsafe {
            if index == 0 {
                (*Self::head(a)).partial_cmp(&*Self::head(b))
            } else {
                Rest::partial_cmp_at(Self::tail(a), Self::tail(b), index - 1)
            }
        }
    }
}

unsafe impl<T: Ord, Rest: OrdChain> OrdChain for Layer<T, Rest> {
    #[inline]
    unsafe fn cmp_at(a: *const Self, b: *const Self, index: usize) -> Ordering {
        unsafe {
            if index == 0 {
                (*Self::head(a)).cmp(&*Self::head(b))
            } else {
                Rest::cmp_at(Self::tail(a), Self::tail(b), index - 1)
            }
        }
    }
}

unsafe impl<T: Hash, Rest: HashChain> HashChain for Layer<T, Rest> {
    #[inline]
    unsafe fn hash_at<H: Hasher>(this: *const Self, index: usize, state: &mut H) {
        unsafe {
            if index == 0 {
                (*Self::head(this)).hash(state);
            } else {
                Rest::hash_at(Self::tail(this), index - 1, state);
            }
        }
    }
}

unsafe impl<T: fmt::Debug, Rest: DebugChain> DebugChain for Layer<T, Rest> {
    unsafe fn fmt_at(this: *const Self, index: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        unsafe {
            if index == 0 {
                fmt::Debug::fmt(&*Self::head(this), f)
            } else {
                Rest::fmt_at(Self::tail(this), index - 1, f)
            }
        }
    }
}

// =============================================================================
// Variant
// =============================================================================

impl<L: Alternatives> Variant<L> {
    #[inline(always)]
    fn chain(&self) -> *const L::Union {
        self.storage.as_ptr().cast()
    }

    /// Order of the two live indices, valueless first.
    fn index_order(&self, other: &Self) -> Ordering {
        match (self.is_valueless(), other.is_valueless()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.index().cmp(&other.index()),
        }
    }
}

impl<L: Alternatives> PartialEq for Variant<L>
where
    L::Union: PartialEqChain,
{
    fn eq(&self, other: &Self) -> bool {
        let index = self.index();
        if index != other.index() {
            return false;
        }
        self.is_valueless()
            || unsafe { <L::Union as PartialEqChain>::eq_at(self.chain(), other.chain(), index) }
    }
}

impl<L: Alternatives> Eq for Variant<L> where L::Union: EqChain {}

impl<L: Alternatives> PartialOrd for Variant<L>
where
    L::Union: PartialOrdChain,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.index_order(other) {
            Ordering::Equal if !self.is_valueless() => unsafe {
                <L::Union as PartialOrdChain>::partial_cmp_at(
                    self.chain(),
                    other.chain(),
                    self.index(),
                )
            },
            order => Some(order),
        }
    }
}

impl<L: Alternatives> Ord for Variant<L>
where
    L::Union: OrdChain,
{
    fn cmp(&self, other: &Self) -> Ordering {
        match self.index_order(other) {
            Ordering::Equal if !self.is_valueless() => unsafe {
                <L::Union as OrdChain>::cmp_at(self.chain(), other.chain(), self.index())
            },
            order => order,
        }
    }
}

impl<L: Alternatives> Hash for Variant<L>
where
    L::Union: HashChain,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index().hash(state);
        if !self.is_valueless() {
            unsafe { <L::Union as HashChain>::hash_at(self.chain(), self.index(), state) }
        }
    }
}

impl<L: Alternatives> fmt::Debug for Variant<L>
where
    L::Union: DebugChain,
{
    /// `Variant(<index>: <value>)`, or `Variant(<valueless>)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valueless() {
            return f.write_str("Variant(<valueless>)");
        }
        write!(f, "Variant({}: ", self.index())?;
        unsafe { <L::Union as DebugChain>::fmt_at(self.chain(), self.index(), f)? };
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn valueless() -> Variant<(i64, String)> {
        let mut v = Variant::new(0i64);
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            v.emplace_with::<1, _>(|| panic!("boom"));
        }));
        v
    }

    #[test]
    fn test_equality() {
        let a = Variant::<(i64, String)>::new(1i64);
        assert_eq!(a, Variant::new(1i64));
        assert_ne!(a, Variant::new(2i64));
        assert_ne!(a, Variant::new("1"));
        assert_eq!(valueless(), valueless());
        assert_ne!(valueless(), a);
    }

    #[test]
    fn test_ordering_by_index_then_value() {
        let int = Variant::<(i64, String)>::new(100i64);
        let small = Variant::<(i64, String)>::new(1i64);
        let text = Variant::<(i64, String)>::new("a");
        assert!(small < int);
        assert!(int < text);
        assert!(text >= int);
        assert!(small <= small.clone());
        assert_eq!(int.cmp(&text), Ordering::Less);
    }

    #[test]
    fn test_valueless_orders_first() {
        let none = valueless();
        let some = Variant::<(i64, String)>::new(i64::MIN);
        assert!(none < some);
        assert!(some > none);
        assert_eq!(none.cmp(&valueless()), Ordering::Equal);
    }

    #[test]
    fn test_partial_order_forwards_nan() {
        let nan = Variant::<(f64, u8)>::new(f64::NAN);
        assert_eq!(nan.partial_cmp(&nan), None);
        assert_ne!(nan, nan);
    }

    #[test]
    fn test_hash_distinguishes_alternatives() {
        let mut set = HashSet::new();
        set.insert(Variant::<(u32, u64)>::with_type::<u32, _>(1));
        set.insert(Variant::<(u32, u64)>::new(1u64));
        set.insert(Variant::<(u32, u64)>::with_type::<u32, _>(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_debug_format() {
        let v = Variant::<(i64, String)>::new("hi");
        assert_eq!(format!("{v:?}"), "Variant(1: \"hi\")");
        assert_eq!(format!("{:?}", valueless()), "Variant(<valueless>)");
    }
}
