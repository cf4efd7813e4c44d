//! Checked Access
//!
//! Reading a variant names the alternative expected to be live, by index or
//! by type. A mismatch, or a valueless variant, is reported as [`BadAccess`]
//! by the `get` family and as `None` by the `get_if` family.
//!
//! Type-addressed access requires the type to appear exactly once in the
//! alternative list; a duplicate does not compile.

use crate::alternatives::{AlternativeAt, Alternatives, IndexOf};
use crate::error::{BadAccess, Result};
use crate::variant::Variant;

impl<L: Alternatives> Variant<L> {
    /// Alternative `I`, if live.
    pub fn get<const I: usize>(&self) -> Result<&<L as AlternativeAt<I>>::Type>
    where
        L: AlternativeAt<I>,
    {
        if self.storage.index() != I {
            return Err(BadAccess::mismatch(I, self.storage.index()));
        }
        Ok(unsafe { self.storage.get_unchecked::<I>() })
    }

    pub fn get_mut<const I: usize>(&mut self) -> Result<&mut <L as AlternativeAt<I>>::Type>
    where
        L: AlternativeAt<I>,
    {
        if self.storage.index() != I {
            return Err(BadAccess::mismatch(I, self.storage.index()));
        }
        Ok(unsafe { self.storage.get_unchecked_mut::<I>() })
    }

    /// The alternative of type `T`, if live.
    pub fn get_type<T, M>(&self) -> Result<&T>
    where
        L::Union: IndexOf<T, M>,
    {
        let index = <L::Union as IndexOf<T, M>>::INDEX;
        if self.storage.index() != index {
            return Err(BadAccess::mismatch(index, self.storage.index()));
        }
        Ok(unsafe { self.storage.get_type_unchecked::<T, M>() })
    }

    pub fn get_type_mut<T, M>(&mut self) -> Result<&mut T>
    where
        L::Union: IndexOf<T, M>,
    {
        let index = <L::Union as IndexOf<T, M>>::INDEX;
        if self.storage.index() != index {
            return Err(BadAccess::mismatch(index, self.storage.index()));
        }
        Ok(unsafe { self.storage.get_type_unchecked_mut::<T, M>() })
    }
}

// =============================================================================
// Free Functions
// =============================================================================

/// Alternative `I` of `variant`.
///
/// ```
/// use tagged_variant::{BadAccess, Variant, get};
///
/// let v = Variant::<(i64, f64)>::new(3i64);
/// assert_eq!(get::<0, _>(&v), Ok(&3));
/// assert_eq!(
///     get::<1, _>(&v),
///     Err(BadAccess::WrongAlternative { requested: 1, held: 0 })
/// );
/// ```
pub fn get<const I: usize, L>(variant: &Variant<L>) -> Result<&<L as AlternativeAt<I>>::Type>
where
    L: AlternativeAt<I>,
{
    variant.get::<I>()
}

pub fn get_mut<const I: usize, L>(
    variant: &mut Variant<L>,
) -> Result<&mut <L as AlternativeAt<I>>::Type>
where
    L: AlternativeAt<I>,
{
    variant.get_mut::<I>()
}

/// Alternative `I`, or `None` for a missing variant or a mismatch.
pub fn get_if<const I: usize, L>(
    variant: Option<&Variant<L>>,
) -> Option<&<L as AlternativeAt<I>>::Type>
where
    L: AlternativeAt<I>,
{
    variant?.get::<I>().ok()
}

pub fn get_if_mut<const I: usize, L>(
    variant: Option<&mut Variant<L>>,
) -> Option<&mut <L as AlternativeAt<I>>::Type>
where
    L: AlternativeAt<I>,
{
    variant?.get_mut::<I>().ok()
}

/// The alternative of type `T` of `variant`.
pub fn get_type<T, L, M>(variant: &Variant<L>) -> Result<&T>
where
    L: Alternatives,
    L::Union: IndexOf<T, M>,
{
    variant.get_type::<T, M>()
}

/// The alternative of type `T`, or `None` for a missing variant or a mismatch.
pub fn get_type_if<T, L, M>(variant: Option<&Variant<L>>) -> Option<&T>
where
    L: Alternatives,
    L::Union: IndexOf<T, M>,
{
    variant?.get_type::<T, M>().ok()
}

/// True when the live alternative of `variant` has type `T`.
pub fn holds_alternative<T, L, M>(variant: &Variant<L>) -> bool
where
    L: Alternatives,
    L::Union: IndexOf<T, M>,
{
    variant.holds::<T, M>()
}
