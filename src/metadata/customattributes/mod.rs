//! Decoded custom attributes.
//!
//! Custom attributes are stored decoded: a constructor reference, the fixed constructor
//! arguments in declaration order, and the named field and property arguments
//! (ECMA-335 II.23.3). Type-valued arguments (`typeof(T)`) are kept as [`TypeSig`] so that
//! the names they mention live in the module's reference tables, while string arguments keep
//! the raw text the attribute was compiled with.
//!
//! [`TypeSig`]: crate::metadata::signature::TypeSig

mod types;

pub use types::{AttributeArgument, AttributeValue, CustomAttribute, NamedArgument};
