//! Access Errors
//!
//! A variant reports a failed access as a value, never as a panic. Asking for
//! an alternative that is not the live one, or touching a variant that was
//! left valueless by a panicking constructor, both produce [`BadAccess`].
//!
//! Failures of the alternatives themselves (a panicking `Clone`, `From` or
//! constructor closure) are not wrapped here: they unwind to the caller
//! unchanged.

use thiserror::Error;

/// Index reported by a variant that holds no value.
pub const VARIANT_NPOS: usize = usize::MAX;

/// A get or visit addressed an alternative that is not live.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadAccess {
    /// The variant holds a different alternative than the one requested.
    #[error("bad variant access: requested alternative {requested}, but alternative {held} is active")]
    WrongAlternative { requested: usize, held: usize },

    /// The variant holds no value at all.
    #[error("bad variant access: variant is valueless by exception")]
    Valueless,
}

impl BadAccess {
    /// Classify a mismatch between the requested index and the held one.
    pub(crate) fn mismatch(requested: usize, held: usize) -> Self {
        if held == VARIANT_NPOS {
            BadAccess::Valueless
        } else {
            BadAccess::WrongAlternative { requested, held }
        }
    }

    /// True when the access failed because the variant was valueless.
    pub fn is_valueless(&self) -> bool {
        matches!(self, BadAccess::Valueless)
    }
}

/// Result type for variant accesses.
pub type Result<T> = std::result::Result<T, BadAccess>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_classifies_valueless() {
        assert_eq!(BadAccess::mismatch(1, VARIANT_NPOS), BadAccess::Valueless);
        assert!(BadAccess::mismatch(1, VARIANT_NPOS).is_valueless());
    }

    #[test]
    fn test_mismatch_reports_both_indices() {
        let err = BadAccess::mismatch(1, 0);
        assert_eq!(
            err,
            BadAccess::WrongAlternative {
                requested: 1,
                held: 0
            }
        );
        assert!(!err.is_valueless());
    }

    #[test]
    fn test_display_messages() {
        let wrong = BadAccess::WrongAlternative {
            requested: 2,
            held: 0,
        };
        assert_eq!(
            wrong.to_string(),
            "bad variant access: requested alternative 2, but alternative 0 is active"
        );
        assert_eq!(
            BadAccess::Valueless.to_string(),
            "bad variant access: variant is valueless by exception"
        );
    }
}
