//! Tagged Variant: a closed-union value type
//!
//! `Variant<(A, B, C)>` holds exactly one value whose type is chosen from a
//! fixed, ordered list of alternatives. The value lives inline, in storage
//! sized and aligned for the largest alternative, next to the index of the
//! live alternative.
//!
//! Key design principles:
//! - Alternatives are addressed by index (`get::<1>()`) or by type
//!   (`get_type::<f64, _>()`); both are checked at compile time.
//! - Converting construction picks the one alternative that implements
//!   `From<T>`; ambiguity is a compile error.
//! - Failed accesses return [`BadAccess`]; they never panic.
//! - Visiting one, two or three variants costs one table lookup per variant.
//!
//! # Modules
//!
//! - `storage`: Union layer chain holding the bytes of one alternative
//! - `alternatives`: Tuple alternative lists, index/type lookups
//! - `resolve`: Converting resolution of an input to one alternative
//! - `variant`: The `Variant` type: construction, assignment, emplace, swap
//! - `access`: Checked accessors (`get`, `get_if`, `holds_alternative`)
//! - `visit`: Dispatch tables and multi-argument visitation
//! - `relational`: Equality, ordering, hashing and `Debug`
//! - `serde_impl`: `(index, value)` encoding (feature `serde`)
//! - `error`: `BadAccess` and the valueless index
//!
//! # Features
//!
//! - `serde` (default): `Serialize`/`Deserialize` as an `(index, value)` tuple
//! - `diagnostics` (default): `tracing` events for alternative switches and
//!   for variants left valueless by a panic
//!
//! # Example
//!
//! ```
//! use tagged_variant::{Variant, Visitor, visit};
//!
//! struct Describe;
//!
//! impl Visitor<&i64> for Describe {
//!     type Output = String;
//!     fn visit(self, value: &i64) -> String {
//!         format!("int {value}")
//!     }
//! }
//!
//! impl Visitor<&String> for Describe {
//!     type Output = String;
//!     fn visit(self, value: &String) -> String {
//!         format!("text {value:?}")
//!     }
//! }
//!
//! let v = Variant::<(i64, String)>::new("hello");
//! assert_eq!(visit(Describe, &v).as_deref(), Ok("text \"hello\""));
//! ```

/// `tracing` event that compiles away without the `diagnostics` feature.
macro_rules! diag {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "diagnostics")]
        {
            tracing::$level!($($arg)+);
        }
    };
}

pub mod access;
pub mod alternatives;
pub mod error;
pub mod relational;
pub mod resolve;
pub mod storage;
pub mod variant;
mod variant_storage;
pub mod visit;

#[cfg(feature = "serde")]
pub mod serde_impl;

// Re-export key types and functions
pub use access::{get, get_if, get_if_mut, get_mut, get_type, get_type_if, holds_alternative};
pub use alternatives::{AlternativeAt, Alternatives, Here, IndexOf, There, variant_size};
pub use error::{BadAccess, Result, VARIANT_NPOS};
pub use resolve::Resolve;
pub use variant::Variant;
pub use visit::{DispatchTable, MAX_ALTERNATIVES, VisitTargets, Visitor, visit, visit_mut};
