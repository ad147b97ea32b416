//! Identity ownership and renaming of individual names.
//!
//! This module answers a single question for the rest of the crate: given a name found
//! somewhere in a module and the request's [`RenameTable`], what should the name become?
//!
//! # Key Components
//!
//! - [`Pattern`] - Positions in which an identity owns a name (`Orig`, `Orig.Foo`,
//!   `<Orig.Foo>k__BackingField`, `List[[Orig.Foo, Orig]]`)
//! - [`Substitution`] - How an owned identity is replaced
//! - [`Rule`] - The pattern and substitution combination used for one kind of name
//! - [`RenameTable`] - Ordered `original -> new` identity mappings
//!
//! # Examples
//!
//! ```rust
//! use dotrename::rename::{RenameTable, Rule};
//!
//! let table = RenameTable::from_pairs([("Orig", "New")])?;
//!
//! assert_eq!(table.rewrite("Orig.Foo", &Rule::NAMESPACE).as_deref(), Some("New.Foo"));
//! assert_eq!(
//!     table.rewrite("<Orig.Foo>k__BackingField", &Rule::MEMBER_NAME).as_deref(),
//!     Some("<New.Foo>k__BackingField")
//! );
//!
//! // Names already owned by the new identity are left alone
//! assert_eq!(table.rewrite("New.Foo", &Rule::NAMESPACE), None);
//! # Ok::<(), dotrename::Error>(())
//! ```

mod pattern;
mod table;

pub use pattern::{Pattern, Substitution};
pub use table::{RenameEntry, RenameTable, Rule};
