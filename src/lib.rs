// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

//! # dotrename
//!
//! Rename the identity of a set of .NET assemblies and rewrite every reference to it.
//!
//! Merging or relocating libraries frequently fails because two assemblies expose the same
//! namespace or the same simple name. `dotrename` takes a set of `(input, output)` module
//! pairs, derives an *original identity* from every input and a *new identity* from every
//! output, and rewrites each module so that the original identity is replaced everywhere it
//! denotes ownership: type namespaces, nested and generic types, member names, compiler
//! generated names, custom attribute arguments, string literals loaded by method bodies, and
//! the assembly references of every other module in the set.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dotrename::prelude::*;
//!
//! let report = RewriteRequest::new()
//!     .with_module("bin/Acme.Core.json", "out/Vendor.Acme.Core.json")
//!     .with_module("bin/Acme.Ui.json", "out/Vendor.Acme.Ui.json")
//!     .with_search_path("refs")
//!     .run(&JsonFormat::default())?;
//!
//! for module in &report.modules {
//!     println!("{} -> {} ({} names)", module.original, module.renamed, module.rewritten);
//! }
//! # Ok::<(), dotrename::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`rename`] - The rename table and the rules deciding whether a name is owned by an identity
//! - [`rewrite`] - The traversal that visits every nameable node of one module
//! - [`project`] - Dependency ordered driver over the whole request
//! - [`file`] - Module format seam, dependency resolution and the output writer
//! - [`metadata`] - The in-memory metadata graph the rewrite operates on
//! - [`events`] - Structured rewrite events and sinks
//!
//! ## Module Formats
//!
//! Parsing and re-serialising PE images is delegated to an implementation of
//! [`file::ModuleFormat`]. The crate ships [`file::JsonFormat`], which stores the metadata
//! graph as a JSON image and is what the command line tool and the tests operate on.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use dotrename::prelude::*;
///
/// let module = JsonFormat::default().read("Orig.json".as_ref())?;
/// println!("Module {} has {} types", module.name, module.types.len());
/// # Ok::<(), dotrename::Error>(())
/// ```
pub mod prelude;

/// Structured events emitted while rewriting, and the sinks that consume them.
pub mod events;

/// In-memory metadata graph of a single module.
///
/// The graph mirrors the ECMA-335 logical model: type definitions and their members, the
/// shared reference tables (assembly, type and member references, method specifications),
/// structural signatures, custom attributes and method bodies.
pub mod metadata;

/// Rename table and rewritability predicate.
pub mod rename;

/// Graph traversal rewriter.
pub mod rewrite;

/// Dependency ordered driver for a whole rewrite request.
pub mod project;

/// Module format seam, dependency resolution and output writing.
pub mod file;

/// `dotrename` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `dotrename` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;
