//! Rewrite result types.

use std::path::PathBuf;

use crate::rewrite::RewriteStats;

/// Outcome of rewriting one module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleReport {
    /// Identity before the rewrite, the file stem of the input
    pub original: String,
    /// Identity after the rewrite, the file stem of the output
    pub renamed: String,
    /// Source path
    pub input: PathBuf,
    /// Destination path
    pub output: PathBuf,
    /// Number of names rewritten inside the module
    pub rewritten: usize,
    /// Names rewritten per kind of node
    pub stats: RewriteStats,
    /// Assembly references moved to a new identity
    pub dependencies_updated: usize,
}

/// Result of a rewrite request.
///
/// # Usage
///
/// ```rust,no_run
/// use dotrename::prelude::*;
///
/// let report = RewriteRequest::new()
///     .with_module("Orig.json", "New.json")
///     .run(&JsonFormat::default())?;
///
/// for identity in &report.completion_order {
///     let module = report.module(identity).unwrap();
///     println!("{} -> {}: {}", module.original, module.renamed, module.stats);
/// }
/// # Ok::<(), dotrename::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewriteReport {
    /// One entry per module, in request order
    pub modules: Vec<ModuleReport>,
    /// Original identities in the order their modules were written
    pub completion_order: Vec<String>,
    /// Whether the outputs were signed
    pub signed: bool,
}

impl RewriteReport {
    /// Report for the module whose original identity is `original`
    #[must_use]
    pub fn module(&self, original: &str) -> Option<&ModuleReport> {
        self.modules.iter().find(|module| module.original == original)
    }

    /// Names rewritten across all modules
    #[must_use]
    pub fn total_rewritten(&self) -> usize {
        self.modules.iter().map(|module| module.rewritten).sum()
    }

    /// Position of `original` in [`RewriteReport::completion_order`]
    #[must_use]
    pub fn completed_at(&self, original: &str) -> Option<usize> {
        self.completion_order.iter().position(|id| id == original)
    }
}
