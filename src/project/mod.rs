//! Rewrite requests over sets of modules.
//!
//! A [`RewriteRequest`] names every module to rewrite as an `(input, output)` pair. The file
//! stems of the pairs form the rename table shared by all modules, so a module in the request
//! sees every other module's new identity while its own names are rewritten.
//!
//! # Dependency Order
//!
//! Each module moves through [`RewriteState`]: `Pending`, `Rewriting`, `Rewritten`. Before
//! a module is rewritten, the assembly references it holds are inspected:
//!
//! - a reference to a `Pending` module in the request rewrites that module first
//! - a reference to a `Rewriting` module is a dependency cycle; it is reported and the
//!   reference is updated from the rename table without waiting
//! - a reference outside the request is located through the search paths, or skipped when it
//!   carries a framework public key token
//!
//! Every module ends `Rewritten` or the request fails with the first error.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dotrename::prelude::*;
//!
//! let report = RewriteRequest::new()
//!     .with_module("bin/App.json", "out/Vendor.App.json")
//!     .with_module("bin/Lib.json", "out/Vendor.Lib.json")
//!     .run(&JsonFormat::default())?;
//!
//! // App references Lib, so Lib was written first
//! assert!(report.completed_at("Lib") < report.completed_at("App"));
//! # Ok::<(), dotrename::Error>(())
//! ```

mod context;
mod loader;
mod result;

pub use context::RewriteState;
pub use loader::{RewriteOptions, RewriteRequest};
pub use result::{ModuleReport, RewriteReport};
