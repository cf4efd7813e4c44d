//! Visitation
//!
//! `visit(f, targets)` calls `f` with the live value of one, two or three
//! variants at once; three is the limit, and `visit_mut` takes exactly one.
//! The alternative types are known at compile time, so every possible call
//! is monomorphized up front into a dispatch table of entry points, and a
//! visit is a table lookup per variant plus one call.
//!
//! ## Dispatch Tables
//!
//! For a list `L` and a visitor `F`, `<L::Union as Dispatch<F>>::TABLE` is an
//! associated `const` built one layer at a time: entry `i` casts the storage
//! pointer to `&T_i` and calls `F::visit`.
//!
//! ## Several Variants
//!
//! The N1 x N2 (x N3) combination table is stored factored. The first
//! variant's table is built for an adapter that, once it knows the first
//! value, looks the second variant up in a table built for that first type:
//!
//! ```text
//! visit(f, (&a, &b))          a.index() == 1, b.index() == 0
//!
//!   table(La, SecondOf)         table(Lb, WithFirst<A1>)
//!   ┌────┬────┬────┐            ┌────┬────┐
//!   │ A0 │ A1 │ A2 │ ─[1]─▶ &a1 │ B0 │ B1 │ ─[0]─▶ f.visit((&a1, &b0))
//!   └────┴────┴────┘            └────┴────┘
//! ```
//!
//! Every visitor must produce the same `Output` for every combination.
//! A valueless participant fails the visit with [`BadAccess::Valueless`]
//! before any entry is called.

use crate::alternatives::Alternatives;
use crate::error::{BadAccess, Result};
use crate::storage::{Layer, Terminal};
use crate::variant::Variant;

/// Capacity of a dispatch table; bounds the number of alternatives.
pub const MAX_ALTERNATIVES: usize = 16;

/// A callable accepting `Args`: a reference for unary visits, a tuple of
/// references for two or three variants.
///
/// Any `FnOnce(Args) -> R` closure is a visitor; a visitor over several
/// alternative types is a struct implementing `Visitor` once per type.
pub trait Visitor<Args> {
    type Output;

    fn visit(self, args: Args) -> Self::Output;
}

impl<F, Args, R> Visitor<Args> for F
where
    F: FnOnce(Args) -> R,
{
    type Output = R;

    #[inline]
    fn visit(self, args: Args) -> R {
        self(args)
    }
}

// =============================================================================
// Tables
// =============================================================================

/// Entry point for a shared visit of one alternative.
pub type RefEntry<F, Out> = unsafe fn(*const u8, F) -> Out;

/// Entry point for a mutable visit of one alternative.
pub type MutEntry<F, Out> = unsafe fn(*mut u8, F) -> Out;

/// Fixed-capacity table of entry points, indexed by alternative.
#[derive(Clone, Copy)]
pub struct DispatchTable<E> {
    entries: [Option<E>; MAX_ALTERNATIVES],
    len: usize,
}

impl<E: Copy> DispatchTable<E> {
    /// Table with no entries: the end of a layer chain.
    pub const EMPTY: Self = DispatchTable {
        entries: [None; MAX_ALTERNATIVES],
        len: 0,
    };

    /// This table shifted up by one with `entry` at index 0.
    pub const fn prepend(&self, entry: E) -> Self {
        assert!(self.len < MAX_ALTERNATIVES, "too many alternatives for a dispatch table");
        let mut entries = [None; MAX_ALTERNATIVES];
        entries[0] = Some(entry);
        let mut i = 0;
        while i < self.len {
            entries[i + 1] = self.entries[i];
            i += 1;
        }
        DispatchTable {
            entries,
            len: self.len + 1,
        }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entry for alternative `index`; `None` past the end, which includes
    /// `VARIANT_NPOS`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<E> {
        if index < self.len {
            self.entries[index]
        } else {
            None
        }
    }
}

unsafe fn visit_ref<'a, T: 'a, F: Visitor<&'a T>>(storage: *const u8, f: F) -> F::Output {
    f.visit(unsafe { &*storage.cast::<T>() })
}

unsafe fn visit_mut_ref<'a, T: 'a, F: Visitor<&'a mut T>>(storage: *mut u8, f: F) -> F::Output {
    f.visit(unsafe { &mut *storage.cast::<T>() })
}

/// Shared-visit table of a layer chain for visitor `F`.
///
/// The output type is taken from the first alternative; every other
/// alternative must agree with it.
#[doc(hidden)]
pub trait Dispatch<'a, F> {
    type Output;

    const TABLE: DispatchTable<RefEntry<F, Self::Output>>;
}

/// Table of the layers after the first, for a fixed output type.
#[doc(hidden)]
pub trait DispatchRest<'a, F, Out> {
    const TABLE: DispatchTable<RefEntry<F, Out>>;
}

impl<'a, F, Out> DispatchRest<'a, F, Out> for Terminal {
    const TABLE: DispatchTable<RefEntry<F, Out>> = DispatchTable::EMPTY;
}

impl<'a, T: 'a, Rest, F, Out> DispatchRest<'a, F, Out> for Layer<T, Rest>
where
    F: Visitor<&'a T, Output = Out>,
    Rest: DispatchRest<'a, F, Out>,
{
    const TABLE: DispatchTable<RefEntry<F, Out>> = Rest::TABLE.prepend(visit_ref::<'a, T, F>);
}

impl<'a, T: 'a, Rest, F> Dispatch<'a, F> for Layer<T, Rest>
where
    F: Visitor<&'a T>,
    Rest: DispatchRest<'a, F, <F as Visitor<&'a T>>::Output>,
{
    type Output = <F as Visitor<&'a T>>::Output;

    const TABLE: DispatchTable<RefEntry<F, Self::Output>> =
        Rest::TABLE.prepend(visit_ref::<'a, T, F>);
}

/// Mutable-visit table of a layer chain for visitor `F`.
#[doc(hidden)]
pub trait DispatchMut<'a, F> {
    type Output;

    const TABLE: DispatchTable<MutEntry<F, Self::Output>>;
}

#[doc(hidden)]
pub trait DispatchMutRest<'a, F, Out> {
    const TABLE: DispatchTable<MutEntry<F, Out>>;
}

impl<'a, F, Out> DispatchMutRest<'a, F, Out> for Terminal {
    const TABLE: DispatchTable<MutEntry<F, Out>> = DispatchTable::EMPTY;
}

impl<'a, T: 'a, Rest, F, Out> DispatchMutRest<'a, F, Out> for Layer<T, Rest>
where
    F: Visitor<&'a mut T, Output = Out>,
    Rest: DispatchMutRest<'a, F, Out>,
{
    const TABLE: DispatchTable<MutEntry<F, Out>> = Rest::TABLE.prepend(visit_mut_ref::<'a, T, F>);
}

impl<'a, T: 'a, Rest, F> DispatchMut<'a, F> for Layer<T, Rest>
where
    F: Visitor<&'a mut T>,
    Rest: DispatchMutRest<'a, F, <F as Visitor<&'a mut T>>::Output>,
{
    type Output = <F as Visitor<&'a mut T>>::Output;

    const TABLE: DispatchTable<MutEntry<F, Self::Output>> =
        Rest::TABLE.prepend(visit_mut_ref::<'a, T, F>);
}

/// Run the entry for `index`, or `None` when no alternative is live.
///
/// # Safety
/// `storage` must be the storage of a variant of chain `U` whose live
/// alternative is `index`, borrowed for `'a`.
#[inline]
unsafe fn dispatch_ref<'a, U, F>(storage: *const u8, index: usize, f: F) -> Option<U::Output>
where
    U: Dispatch<'a, F>,
{
    let entry = U::TABLE.get(index)?;
    Some(unsafe { entry(storage, f) })
}

/// [`dispatch_ref`] for a variant already checked to hold a value.
///
/// # Safety
/// Same as [`dispatch_ref`].
#[inline]
unsafe fn dispatch_live<'a, U, F>(storage: *const u8, index: usize, f: F) -> U::Output
where
    U: Dispatch<'a, F>,
{
    match unsafe { dispatch_ref::<'a, U, F>(storage, index, f) } {
        Some(output) => output,
        None => unreachable!("visit reached alternative index {index} after the liveness check"),
    }
}

// =============================================================================
// Curried Adapters
// =============================================================================

/// Second stage of a binary visit: the first value is known.
#[doc(hidden)]
pub struct WithFirst<'a, A, F> {
    first: &'a A,
    f: F,
}

impl<'a, A, B: 'a, F> Visitor<&'a B> for WithFirst<'a, A, F>
where
    F: Visitor<(&'a A, &'a B)>,
{
    type Output = <F as Visitor<(&'a A, &'a B)>>::Output;

    #[inline]
    fn visit(self, second: &'a B) -> Self::Output {
        self.f.visit((self.first, second))
    }
}

/// First stage of a binary visit: dispatches the second variant once the
/// first value is known.
#[doc(hidden)]
pub struct SecondOf<'a, L2: Alternatives, F> {
    second: &'a Variant<L2>,
    f: F,
}

impl<'a, A: 'a, L2, F> Visitor<&'a A> for SecondOf<'a, L2, F>
where
    L2: Alternatives,
    L2::Union: Dispatch<'a, WithFirst<'a, A, F>>,
{
    type Output = <L2::Union as Dispatch<'a, WithFirst<'a, A, F>>>::Output;

    #[inline]
    fn visit(self, first: &'a A) -> Self::Output {
        let (second, next) = (self.second, WithFirst { first, f: self.f });
        unsafe { dispatch_live::<'a, L2::Union, _>(second.storage.as_ptr(), second.index(), next) }
    }
}

/// Last stage of a ternary visit: the first two values are known.
#[doc(hidden)]
pub struct WithFirstTwo<'a, A, B, F> {
    first: &'a A,
    second: &'a B,
    f: F,
}

impl<'a, A, B, C: 'a, F> Visitor<&'a C> for WithFirstTwo<'a, A, B, F>
where
    F: Visitor<(&'a A, &'a B, &'a C)>,
{
    type Output = <F as Visitor<(&'a A, &'a B, &'a C)>>::Output;

    #[inline]
    fn visit(self, third: &'a C) -> Self::Output {
        self.f.visit((self.first, self.second, third))
    }
}

/// Second stage of a ternary visit: dispatches the third variant.
#[doc(hidden)]
pub struct ThirdAfter<'a, A, L3: Alternatives, F> {
    first: &'a A,
    third: &'a Variant<L3>,
    f: F,
}

impl<'a, A, B: 'a, L3, F> Visitor<&'a B> for ThirdAfter<'a, A, L3, F>
where
    L3: Alternatives,
    L3::Union: Dispatch<'a, WithFirstTwo<'a, A, B, F>>,
{
    type Output = <L3::Union as Dispatch<'a, WithFirstTwo<'a, A, B, F>>>::Output;

    #[inline]
    fn visit(self, second: &'a B) -> Self::Output {
        let next = WithFirstTwo {
            first: self.first,
            second,
            f: self.f,
        };
        let third = self.third;
        unsafe { dispatch_live::<'a, L3::Union, _>(third.storage.as_ptr(), third.index(), next) }
    }
}

/// First stage of a ternary visit.
#[doc(hidden)]
pub struct SecondOfThree<'a, L2: Alternatives, L3: Alternatives, F> {
    second: &'a Variant<L2>,
    third: &'a Variant<L3>,
    f: F,
}

impl<'a, A: 'a, L2, L3, F> Visitor<&'a A> for SecondOfThree<'a, L2, L3, F>
where
    L2: Alternatives,
    L3: Alternatives,
    L2::Union: Dispatch<'a, ThirdAfter<'a, A, L3, F>>,
{
    type Output = <L2::Union as Dispatch<'a, ThirdAfter<'a, A, L3, F>>>::Output;

    #[inline]
    fn visit(self, first: &'a A) -> Self::Output {
        let second = self.second;
        let next = ThirdAfter {
            first,
            third: self.third,
            f: self.f,
        };
        unsafe { dispatch_live::<'a, L2::Union, _>(second.storage.as_ptr(), second.index(), next) }
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// One, two or three variants that can be visited together by `F`.
///
/// Implemented for `&Variant`, and for 2- and 3-tuples of `&Variant`. Four
/// or more variants are not supported; nest two visits instead.
pub trait VisitTargets<F> {
    type Output;

    fn visit_with(self, f: F) -> Result<Self::Output>;
}

impl<'a, L, F> VisitTargets<F> for &'a Variant<L>
where
    L: Alternatives,
    L::Union: Dispatch<'a, F>,
{
    type Output = <L::Union as Dispatch<'a, F>>::Output;

    fn visit_with(self, f: F) -> Result<Self::Output> {
        unsafe { dispatch_ref::<'a, L::Union, F>(self.storage.as_ptr(), self.index(), f) }
            .ok_or(BadAccess::Valueless)
    }
}

impl<'a, L1, L2, F> VisitTargets<F> for (&'a Variant<L1>, &'a Variant<L2>)
where
    L1: Alternatives,
    L2: Alternatives,
    L1::Union: Dispatch<'a, SecondOf<'a, L2, F>>,
{
    type Output = <L1::Union as Dispatch<'a, SecondOf<'a, L2, F>>>::Output;

    fn visit_with(self, f: F) -> Result<Self::Output> {
        let (first, second) = self;
        if second.is_valueless() {
            return Err(BadAccess::Valueless);
        }
        let next = SecondOf { second, f };
        unsafe { dispatch_ref::<'a, L1::Union, _>(first.storage.as_ptr(), first.index(), next) }
            .ok_or(BadAccess::Valueless)
    }
}

impl<'a, L1, L2, L3, F> VisitTargets<F> for (&'a Variant<L1>, &'a Variant<L2>, &'a Variant<L3>)
where
    L1: Alternatives,
    L2: Alternatives,
    L3: Alternatives,
    L1::Union: Dispatch<'a, SecondOfThree<'a, L2, L3, F>>,
{
    type Output = <L1::Union as Dispatch<'a, SecondOfThree<'a, L2, L3, F>>>::Output;

    fn visit_with(self, f: F) -> Result<Self::Output> {
        let (first, second, third) = self;
        if second.is_valueless() || third.is_valueless() {
            return Err(BadAccess::Valueless);
        }
        let next = SecondOfThree { second, third, f };
        unsafe { dispatch_ref::<'a, L1::Union, _>(first.storage.as_ptr(), first.index(), next) }
            .ok_or(BadAccess::Valueless)
    }
}

/// Call `f` with the live values of `targets`: `&v`, `(&a, &b)` or
/// `(&a, &b, &c)`.
///
/// At most three variants are visited at once, and only through shared
/// references. Mutable visiting ([`visit_mut`]) takes a single variant.
///
/// ```compile_fail
/// use tagged_variant::{Variant, visit};
///
/// let v = Variant::<(i64,)>::new(1i64);
/// // Four participants have no dispatch path.
/// let _ = visit(|_: (&i64, &i64, &i64, &i64)| (), (&v, &v, &v, &v));
/// ```
///
/// ```
/// use tagged_variant::{Variant, Visitor, visit};
///
/// struct Sum;
///
/// impl Visitor<(&i64, &i64)> for Sum {
///     type Output = f64;
///     fn visit(self, (a, b): (&i64, &i64)) -> f64 { (a + b) as f64 }
/// }
/// impl Visitor<(&i64, &f64)> for Sum {
///     type Output = f64;
///     fn visit(self, (a, b): (&i64, &f64)) -> f64 { *a as f64 + b }
/// }
/// impl Visitor<(&f64, &i64)> for Sum {
///     type Output = f64;
///     fn visit(self, (a, b): (&f64, &i64)) -> f64 { a + *b as f64 }
/// }
/// impl Visitor<(&f64, &f64)> for Sum {
///     type Output = f64;
///     fn visit(self, (a, b): (&f64, &f64)) -> f64 { a + b }
/// }
///
/// let a = Variant::<(i64, f64)>::new(2i64);
/// let b = Variant::<(i64, f64)>::new(0.5f64);
/// assert_eq!(visit(Sum, (&a, &b)), Ok(2.5));
/// ```
pub fn visit<F, V>(f: F, targets: V) -> Result<V::Output>
where
    V: VisitTargets<F>,
{
    targets.visit_with(f)
}

/// Call `f` with a mutable reference to the live value of `variant`.
///
/// Only one variant can be visited mutably at a time.
pub fn visit_mut<'a, L, F>(
    f: F,
    variant: &'a mut Variant<L>,
) -> Result<<L::Union as DispatchMut<'a, F>>::Output>
where
    L: Alternatives,
    L::Union: DispatchMut<'a, F>,
{
    let index = variant.index();
    let entry = <L::Union as DispatchMut<'a, F>>::TABLE
        .get(index)
        .ok_or(BadAccess::Valueless)?;
    Ok(unsafe { entry(variant.storage.as_mut_ptr(), f) })
}

impl<L: Alternatives> Variant<L> {
    /// Method form of [`visit`] for a single variant.
    pub fn visit<'a, F>(&'a self, f: F) -> Result<<L::Union as Dispatch<'a, F>>::Output>
    where
        L::Union: Dispatch<'a, F>,
    {
        VisitTargets::visit_with(self, f)
    }

    /// Method form of [`visit_mut`].
    pub fn visit_mut<'a, F>(&'a mut self, f: F) -> Result<<L::Union as DispatchMut<'a, F>>::Output>
    where
        L::Union: DispatchMut<'a, F>,
    {
        visit_mut(f, self)
    }
}
