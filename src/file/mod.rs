//! Module images on disk.
//!
//! This module connects the in-memory [`ModuleDef`] to files: reading and writing module
//! images, locating dependencies that are not part of a rewrite request and re-signing the
//! output.
//!
//! # Key Components
//!
//! - [`ModuleFormat`] - Trait implemented by module image formats
//! - [`JsonFormat`] - Metadata image serialized with `serde_json`
//! - [`AssemblyResolver`] - Finds a dependency by name in the search paths
//! - [`OutputWriter`] - Writes a rewritten module, replacing its source in place if needed
//! - [`StrongNameKey`] - Signing key applied by the writer
//!
//! # Examples
//!
//! ```rust,no_run
//! use dotrename::file::{JsonFormat, ModuleFormat};
//! use std::path::Path;
//!
//! let format = JsonFormat::default();
//! let module = format.read(Path::new("Orig.json"))?;
//! println!("{} has {} types", module.identity(), module.types.len());
//! # Ok::<(), dotrename::Error>(())
//! ```

mod json;
mod resolver;
mod writer;

pub use json::JsonFormat;
pub use resolver::AssemblyResolver;
pub use writer::{OutputWriter, StrongNameKey};
pub(crate) use writer::same_file;

use std::path::Path;

use crate::{metadata::module::ModuleDef, Result};

/// Extensions of PE module images
pub const DEFAULT_EXTENSIONS: &[&str] = &["dll", "exe"];

/// A serialized representation of a module.
///
/// The rewrite engine only ever sees [`ModuleDef`]; everything about the byte layout of a
/// module lives behind this trait.
pub trait ModuleFormat {
    /// Parse a module image
    ///
    /// # Errors
    /// Returns an error if `data` is not a valid image.
    fn decode(&self, data: &[u8]) -> Result<ModuleDef>;

    /// Serialize a module image
    ///
    /// # Errors
    /// Returns an error if the module cannot be represented in this format.
    fn encode(&self, module: &ModuleDef) -> Result<Vec<u8>>;

    /// File extensions, without the dot, under which a dependency in this format is looked
    /// for, in lookup order
    fn extensions(&self) -> &'static [&'static str] {
        DEFAULT_EXTENSIONS
    }

    /// Read and parse the module at `path`
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read, or any error of
    /// [`ModuleFormat::decode`].
    fn read(&self, path: &Path) -> Result<ModuleDef> {
        let data = std::fs::read(path)?;
        self.decode(&data)
    }
}
