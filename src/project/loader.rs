//! `RewriteRequest` builder API.

use std::path::{Path, PathBuf};

use crate::{
    events::{EventSink, LogSink, Verbosity},
    file::ModuleFormat,
    project::{context::RewriteContext, RewriteReport},
    Error, Result,
};

/// Settings shared by every module of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Whether per-name events are reported
    pub verbosity: Verbosity,
    /// Strong name key applied to every output; a missing file disables signing
    pub key_file: Option<PathBuf>,
    /// Directories searched for dependencies outside the request
    pub search_paths: Vec<PathBuf>,
}

/// Builder for a rewrite over a set of modules.
///
/// Every module is given as an `(input, output)` pair. The file stem of the input is the
/// module's original identity and the file stem of the output its new identity, so
/// `bin/Acme.Core.dll -> out/Vendor.Acme.Core.dll` renames `Acme.Core` to
/// `Vendor.Acme.Core`.
///
/// # Usage Examples
///
/// ## Pairs From Two Lists
/// ```rust,no_run
/// use dotrename::prelude::*;
///
/// let inputs = vec!["bin/A.json", "bin/B.json"];
/// let outputs = vec!["out/X.A.json", "out/X.B.json"];
///
/// let report = RewriteRequest::from_pairs(inputs, outputs)?
///     .with_search_path("bin/refs")
///     .with_key_file("keys/vendor.snk")
///     .with_verbosity(Verbosity::Detailed)
///     .run(&JsonFormat::default())?;
/// # Ok::<(), dotrename::Error>(())
/// ```
///
/// ## Collecting Events
/// ```rust,no_run
/// use dotrename::prelude::*;
/// use std::cell::RefCell;
///
/// let events = RefCell::new(Vec::new());
/// let sink = |event: RewriteEvent| events.borrow_mut().push(event);
///
/// RewriteRequest::new()
///     .with_module("Orig.json", "New.json")
///     .run_with_sink(&JsonFormat::default(), &sink)?;
/// # Ok::<(), dotrename::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RewriteRequest {
    /// `(input, output)` module pairs in request order
    modules: Vec<(PathBuf, PathBuf)>,
    /// Request wide settings
    options: RewriteOptions,
}

impl RewriteRequest {
    /// Create an empty request
    #[must_use]
    pub fn new() -> Self {
        RewriteRequest::default()
    }

    /// Build a request from parallel input and output lists.
    ///
    /// # Errors
    /// Returns [`Error::PathCountMismatch`] if the lists differ in length.
    pub fn from_pairs<I, O>(inputs: Vec<I>, outputs: Vec<O>) -> Result<Self>
    where
        I: AsRef<Path>,
        O: AsRef<Path>,
    {
        if inputs.len() != outputs.len() {
            return Err(Error::PathCountMismatch {
                inputs: inputs.len(),
                outputs: outputs.len(),
            });
        }

        let modules = inputs
            .iter()
            .zip(&outputs)
            .map(|(input, output)| (input.as_ref().to_path_buf(), output.as_ref().to_path_buf()))
            .collect();

        Ok(RewriteRequest {
            modules,
            options: RewriteOptions::default(),
        })
    }

    /// Add a module to rewrite from `input` into `output`
    #[must_use]
    pub fn with_module<P: AsRef<Path>, Q: AsRef<Path>>(mut self, input: P, output: Q) -> Self {
        self.modules
            .push((input.as_ref().to_path_buf(), output.as_ref().to_path_buf()));
        self
    }

    /// Add a directory searched for dependencies outside the request
    #[must_use]
    pub fn with_search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.options.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Sign every output with the key at `path`
    #[must_use]
    pub fn with_key_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.options.key_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set how much is reported
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.options.verbosity = verbosity;
        self
    }

    /// Replace all options
    #[must_use]
    pub fn with_options(mut self, options: RewriteOptions) -> Self {
        self.options = options;
        self
    }

    /// The `(input, output)` pairs
    #[must_use]
    pub fn modules(&self) -> &[(PathBuf, PathBuf)] {
        &self.modules
    }

    /// The request options
    #[must_use]
    pub fn options(&self) -> &RewriteOptions {
        &self.options
    }

    /// Run the request, reporting through the `log` facade.
    ///
    /// # Errors
    /// See [`RewriteRequest::run_with_sink`].
    pub fn run(&self, format: &dyn ModuleFormat) -> Result<RewriteReport> {
        self.run_with_sink(format, &LogSink)
    }

    /// Run the request, reporting to `sink`.
    ///
    /// Modules are rewritten in request order, except that a module in the request is always
    /// rewritten before the modules depending on it. The first failure aborts the request.
    ///
    /// # Errors
    /// - [`Error::InvalidPath`] if a path has no usable file stem
    /// - [`Error::DuplicateIdentity`] if two inputs or two outputs share an identity
    /// - [`Error::Load`] if a module cannot be read
    /// - [`Error::Resolution`] if a dependency outside the request cannot be found
    /// - [`Error::Structural`] if a module's metadata graph is inconsistent
    /// - [`Error::Write`] if an output cannot be written
    pub fn run_with_sink(
        &self,
        format: &dyn ModuleFormat,
        sink: &dyn EventSink,
    ) -> Result<RewriteReport> {
        RewriteContext::new(&self.modules, &self.options, format, sink)?.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let request = RewriteRequest::new()
            .with_module("bin/Orig.dll", "out/New.dll")
            .with_search_path("refs")
            .with_key_file("key.snk")
            .with_verbosity(Verbosity::Detailed);

        assert_eq!(
            request.modules(),
            &[(PathBuf::from("bin/Orig.dll"), PathBuf::from("out/New.dll"))]
        );
        assert_eq!(request.options().search_paths, vec![PathBuf::from("refs")]);
        assert_eq!(request.options().key_file, Some(PathBuf::from("key.snk")));
        assert_eq!(request.options().verbosity, Verbosity::Detailed);
    }

    #[test]
    fn test_from_pairs_length_mismatch() {
        let result = RewriteRequest::from_pairs(vec!["A.dll", "B.dll"], vec!["X.dll"]);
        assert!(matches!(
            result,
            Err(Error::PathCountMismatch {
                inputs: 2,
                outputs: 1
            })
        ));

        let request = RewriteRequest::from_pairs(vec!["A.dll"], vec!["X.dll"]).unwrap();
        assert_eq!(request.modules().len(), 1);
    }
}
