//! Dependency ordered rewriting of all modules in a request.

use std::path::{Path, PathBuf};

use crate::{
    events::{EventSink, FilteredSink, RewriteEvent},
    file::{same_file, AssemblyResolver, ModuleFormat, OutputWriter, StrongNameKey},
    metadata::{identity::token_to_hex, module::ModuleDef},
    project::{loader::RewriteOptions, ModuleReport, RewriteReport},
    rename::RenameTable,
    rewrite::ModuleRewriter,
    Error, Result,
};

/// Progress of one module through a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewriteState {
    /// Not reached yet
    #[default]
    Pending,
    /// Dependencies or the module itself are being rewritten
    Rewriting,
    /// Written to its destination
    Rewritten,
}

/// One module of the request.
#[derive(Debug)]
pub(crate) struct ModuleRecord {
    pub(crate) input: PathBuf,
    pub(crate) output: PathBuf,
    pub(crate) original: String,
    pub(crate) renamed: String,
    pub(crate) state: RewriteState,
    pub(crate) report: Option<ModuleReport>,
}

/// Driver state for a single run of a [`crate::project::RewriteRequest`].
pub(crate) struct RewriteContext<'a> {
    records: Vec<ModuleRecord>,
    table: RenameTable,
    format: &'a dyn ModuleFormat,
    sink: FilteredSink<'a>,
    resolver: AssemblyResolver,
    key_file: Option<&'a Path>,
    completion_order: Vec<String>,
}

impl<'a> RewriteContext<'a> {
    pub(crate) fn new(
        modules: &[(PathBuf, PathBuf)],
        options: &'a RewriteOptions,
        format: &'a dyn ModuleFormat,
        sink: &'a dyn EventSink,
    ) -> Result<Self> {
        let mut table = RenameTable::new();
        let mut records = Vec::with_capacity(modules.len());

        for (input, output) in modules {
            let original = identity_of(input)?;
            let renamed = identity_of(output)?;
            table.insert(original.clone(), renamed.clone())?;

            records.push(ModuleRecord {
                input: input.clone(),
                output: output.clone(),
                original,
                renamed,
                state: RewriteState::Pending,
                report: None,
            });
        }

        check_paths(&records)?;

        Ok(RewriteContext {
            records,
            table,
            format,
            sink: FilteredSink::new(sink, options.verbosity),
            resolver: AssemblyResolver::new(options.search_paths.clone())
                .with_extensions(format.extensions()),
            key_file: options.key_file.as_deref(),
            completion_order: Vec::new(),
        })
    }

    pub(crate) fn run(mut self) -> Result<RewriteReport> {
        let key = match self.key_file {
            Some(path) => {
                let key = StrongNameKey::load(path)?;
                if key.is_none() {
                    self.sink.emit(RewriteEvent::SigningSkipped {
                        path: path.to_path_buf(),
                    });
                }
                key
            }
            None => None,
        };

        for index in 0..self.records.len() {
            self.rewrite_module(index, key.as_ref())?;
        }

        Ok(RewriteReport {
            modules: self
                .records
                .into_iter()
                .filter_map(|record| record.report)
                .collect(),
            completion_order: self.completion_order,
            signed: key.is_some(),
        })
    }

    fn find(&self, identity: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.original == identity)
    }

    /// Drive `index` through `Pending -> Rewriting -> Rewritten`, dependencies in the request
    /// first.
    fn rewrite_module(&mut self, index: usize, key: Option<&StrongNameKey>) -> Result<()> {
        if self.records[index].state != RewriteState::Pending {
            return Ok(());
        }
        self.records[index].state = RewriteState::Rewriting;

        let input = self.records[index].input.clone();
        let output = self.records[index].output.clone();
        let original = self.records[index].original.clone();
        let renamed = self.records[index].renamed.clone();

        self.sink.emit(RewriteEvent::ModuleStarted {
            identity: original.clone(),
            path: input.clone(),
        });

        let mut module = self.format.read(&input).map_err(|source| Error::Load {
            path: input.clone(),
            source: Box::new(source),
        })?;

        let dependencies_updated = self.order_dependencies(index, &mut module, key)?;

        let rewriter = ModuleRewriter::new(&self.table, &self.sink);
        let stats = rewriter.rewrite_names(&mut module)?;
        rewriter.move_identity(&mut module, &renamed);

        OutputWriter::new(self.format, key).write(&mut module, &input, &output)?;
        if let Some(key) = key {
            self.sink.emit(RewriteEvent::Signed {
                identity: renamed.clone(),
                token: token_to_hex(&key.token()),
            });
        }

        self.sink.emit(RewriteEvent::ModuleFinished {
            identity: original.clone(),
            renamed: renamed.clone(),
            output: output.clone(),
        });

        let record = &mut self.records[index];
        record.state = RewriteState::Rewritten;
        record.report = Some(ModuleReport {
            original: original.clone(),
            renamed,
            input,
            output,
            rewritten: stats.total(),
            stats,
            dependencies_updated,
        });
        self.completion_order.push(original);
        Ok(())
    }

    /// Rewrite the module's dependencies in the request first and point its references at
    /// their new identities; locate the dependencies outside the request.
    fn order_dependencies(
        &mut self,
        index: usize,
        module: &mut ModuleDef,
        key: Option<&StrongNameKey>,
    ) -> Result<usize> {
        let identity = self.records[index].original.clone();
        let input = self.records[index].input.clone();
        let mut updated = 0;

        for assembly_ref in &mut module.references.assembly_refs {
            let Some(dependency) = self.find(&assembly_ref.name) else {
                let path = self.resolver.resolve(assembly_ref, &input)?;
                self.sink.emit(RewriteEvent::DependencyResolved {
                    module: identity.clone(),
                    dependency: assembly_ref.name.clone(),
                    path,
                });
                continue;
            };

            match self.records[dependency].state {
                RewriteState::Pending => {
                    self.sink.emit(RewriteEvent::DependencyFirst {
                        module: identity.clone(),
                        dependency: assembly_ref.name.clone(),
                    });
                    self.rewrite_module(dependency, key)?;
                }
                // The rename table is fixed for the whole request, so the reference can be
                // updated before the dependency is finished
                RewriteState::Rewriting if dependency != index => {
                    self.sink.emit(RewriteEvent::DependencyCycle {
                        module: identity.clone(),
                        dependency: assembly_ref.name.clone(),
                    });
                }
                RewriteState::Rewriting | RewriteState::Rewritten => {}
            }

            let renamed = &self.records[dependency].renamed;
            if assembly_ref.name != *renamed {
                let from = std::mem::replace(&mut assembly_ref.name, renamed.clone());
                self.sink.emit(RewriteEvent::DependencyUpdated {
                    module: identity.clone(),
                    from,
                    to: renamed.clone(),
                });
                updated += 1;
            }
            if let Some(key) = key {
                assembly_ref.public_key_token = Some(key.token());
            }
        }

        Ok(updated)
    }
}

/// No output may replace the input of a different module; it would be read after being
/// overwritten.
fn check_paths(records: &[ModuleRecord]) -> Result<()> {
    for (index, record) in records.iter().enumerate() {
        let conflict = records
            .iter()
            .enumerate()
            .find(|(other, target)| *other != index && same_file(&record.output, &target.input));
        if let Some((_, target)) = conflict {
            return Err(Error::PathConflict {
                output: record.output.clone(),
                input: target.input.clone(),
            });
        }
    }
    Ok(())
}

/// Identity named by a module path: its file stem
fn identity_of(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))
}
