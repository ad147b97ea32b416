//! Graph traversal rewriter.
//!
//! [`ModuleRewriter`] walks the complete metadata graph of one module and applies the
//! [`RenameTable`] to every name it finds. The walk is exhaustive: type definitions (nested
//! types first), their members, generic parameters and constraints, custom attributes,
//! method bodies, exported types and the module and assembly attributes. A final sweep
//! visits every reference-table entry the walk did not reach, so references only used by
//! local variables, catch clauses or untouched instructions are renamed as well.
//!
//! Reference entries are shared: a type reference to `Orig.Bar` used from a hundred
//! signatures exists once, and renaming it renames every use. Each entry is visited at most
//! once, tracked by an `Unvisited -> InProgress -> Done` memo, which also detects cycles
//! that a well formed module cannot contain (a type nested in itself, a type reference scoped
//! to itself).
//!
//! # Examples
//!
//! ```rust
//! use dotrename::prelude::*;
//! use dotrename::events::NullSink;
//!
//! let mut module = ModuleDef::new("Orig.dll", "Orig");
//! module.add_type(TypeDef::new("Orig.Collections", "Bag"));
//!
//! let table = RenameTable::from_pairs([("Orig", "New")])?;
//! let stats = ModuleRewriter::new(&table, &NullSink).rewrite(&mut module)?;
//!
//! assert_eq!(module.types[0].namespace, "New.Collections");
//! assert_eq!(module.identity(), "New");
//! assert_eq!(stats.count(NodeKind::Namespace), 1);
//! # Ok::<(), dotrename::Error>(())
//! ```

mod attributes;
mod body;
mod types;
mod visitor;

use std::{collections::BTreeMap, fmt, path::Path};

use crate::{
    events::{EventSink, NodeKind},
    metadata::module::ModuleDef,
    rename::{RenameTable, Rule},
    rewrite::visitor::{DefShape, Visitor},
    Result,
};

/// Number of names rewritten per kind of node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteStats {
    counts: BTreeMap<NodeKind, usize>,
}

impl RewriteStats {
    pub(crate) fn record(&mut self, kind: NodeKind) {
        *self.counts.entry(kind).or_default() += 1;
    }

    /// Names of `kind` rewritten
    #[must_use]
    pub fn count(&self, kind: NodeKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Names rewritten in total
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Non-zero counts in [`NodeKind`] order
    pub fn iter(&self) -> impl Iterator<Item = (NodeKind, usize)> + '_ {
        self.counts.iter().map(|(kind, count)| (*kind, *count))
    }
}

impl fmt::Display for RewriteStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} names", self.total())?;
        let mut separator = " (";
        for (kind, count) in self.iter() {
            write!(f, "{separator}{kind}: {count}")?;
            separator = ", ";
        }
        if !self.counts.is_empty() {
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Rewrites modules in memory against a rename table.
pub struct ModuleRewriter<'a> {
    table: &'a RenameTable,
    sink: &'a dyn EventSink,
}

impl<'a> ModuleRewriter<'a> {
    /// Create a rewriter reporting to `sink`
    #[must_use]
    pub fn new(table: &'a RenameTable, sink: &'a dyn EventSink) -> Self {
        ModuleRewriter { table, sink }
    }

    /// Rewrite every name in `module`, then move the module to its new identity.
    ///
    /// Assembly references are left to the caller, which knows where the dependencies went;
    /// see [`crate::project::RewriteRequest`].
    ///
    /// # Errors
    /// Returns [`crate::Error::Structural`] if the graph is inconsistent: a dangling index
    /// (including definition tokens and forwarding targets), a nesting or scope cycle, an attribute constructor not declared on a type, or an
    /// instruction whose operand does not fit its opcode.
    pub fn rewrite(&self, module: &mut ModuleDef) -> Result<RewriteStats> {
        let stats = self.rewrite_names(module)?;
        self.rename_identity(module);
        Ok(stats)
    }

    /// Rewrite every name in `module` without touching its identity
    ///
    /// # Errors
    /// See [`ModuleRewriter::rewrite`].
    pub fn rewrite_names(&self, module: &mut ModuleDef) -> Result<RewriteStats> {
        let ModuleDef {
            name,
            assembly,
            custom_attributes,
            types,
            exported_types,
            references,
            ..
        } = module;

        let mut visitor =
            Visitor::new(self.table, self.sink, references).with_defs(DefShape::of(types));

        types::visit_types(&mut visitor, types)?;

        for exported in exported_types.iter_mut() {
            if let Some(assembly) = exported.forwarded_to {
                visitor.check_assembly_ref(assembly)?;
            }
            visitor.rename(NodeKind::ExportedType, &mut exported.namespace, &Rule::NAMESPACE);
            visitor.rename(NodeKind::ExportedType, &mut exported.name, &Rule::SYNTHETIC);
        }

        attributes::visit_attributes(
            &mut visitor,
            &|| format!("module {name}"),
            custom_attributes,
        )?;
        attributes::visit_assembly_attributes(
            &mut visitor,
            &assembly.name,
            &mut assembly.custom_attributes,
        )?;

        visitor.sweep()?;
        Ok(visitor.stats)
    }

    /// Move the assembly and the module file name to the new identity, if the table maps
    /// the module's identity. Returns the new identity.
    pub fn rename_identity(&self, module: &mut ModuleDef) -> Option<String> {
        let new = self.table.new_identity(module.identity())?.to_string();
        self.move_identity(module, &new);
        Some(new)
    }

    /// Give `module` the identity `new`. The module file name follows when its stem is the
    /// previous identity.
    pub fn move_identity(&self, module: &mut ModuleDef, new: &str) {
        let original = std::mem::replace(&mut module.assembly.name, new.to_string());

        let file = Path::new(&module.name);
        if file.file_stem().and_then(|stem| stem.to_str()) == Some(original.as_str()) {
            module.name = match file.extension().and_then(|ext| ext.to_str()) {
                Some(ext) => format!("{new}.{ext}"),
                None => new.to_string(),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::{NullSink, RewriteEvent},
        metadata::{
            body::Operand,
            customattributes::AttributeValue,
            signature::TypeSig,
            token::{TypeDefId, TypeToken},
        },
        test::{orig_module, CollectingSink},
    };

    fn rewrite(module: &mut ModuleDef) -> RewriteStats {
        let table = RenameTable::from_pairs([("Orig", "New")]).unwrap();
        ModuleRewriter::new(&table, &NullSink).rewrite(module).unwrap()
    }

    #[test]
    fn test_exhaustive() {
        let mut module = orig_module();
        rewrite(&mut module);

        let json = serde_json::to_string(&module).unwrap();
        assert!(!json.contains("Orig"), "identity left behind in {json}");
    }

    #[test]
    fn test_locations() {
        let mut module = orig_module();
        let stats = rewrite(&mut module);

        let foo = module.find_type("New", "Foo").unwrap();
        let bar = module.find_type("New", "Bar").unwrap();
        let attr = module.find_type("New", "Attr").unwrap();
        let ty = &module.types[foo.0];

        assert_eq!(ty.fields[0].field_type, TypeSig::class(TypeToken::Def(bar)));
        assert_eq!(ty.fields[1].name, "<New.Foo>k__BackingField");
        assert_eq!(ty.properties[0].property_type, TypeSig::class(TypeToken::Def(bar)));
        assert_eq!(
            ty.custom_attributes[0].constructor,
            crate::metadata::members::MethodRef::Def { owner: attr, index: 0 }
        );
        assert_eq!(ty.methods[1].name, "New.IFoo.Method");

        let run = ty.methods[3].body.as_ref().unwrap();
        assert_eq!(run.instructions[4].operand, Operand::String("New.Key".into()));

        let nested = module.types[ty.nested_types[0].0].name.as_str();
        assert_eq!(nested, "<New-Bar>d__0");

        assert_eq!(module.name, "New.dll");
        assert_eq!(module.assembly.name, "New");
        assert_eq!(
            module.assembly.custom_attributes[0].fixed_args[0].value,
            AttributeValue::String("New".into())
        );
        assert_eq!(module.exported_types[0].namespace, "New.Moved");
        assert_eq!(module.references.type_refs[3].namespace, "New.Helpers");

        assert_eq!(stats.count(NodeKind::Namespace), 4);
        assert_eq!(stats.count(NodeKind::TypeName), 1);
    }

    #[test]
    fn test_second_pass_changes_nothing() {
        let mut module = orig_module();
        rewrite(&mut module);
        let once = module.clone();

        let table = RenameTable::from_pairs([("Orig", "New")]).unwrap();
        let stats = ModuleRewriter::new(&table, &NullSink)
            .rewrite_names(&mut module)
            .unwrap();

        assert_eq!(stats.total(), 0);
        assert_eq!(module, once);
    }

    #[test]
    fn test_title_event() {
        let mut module = orig_module();
        let table = RenameTable::from_pairs([("Orig", "New")]).unwrap();
        let sink = CollectingSink::default();
        ModuleRewriter::new(&table, &sink).rewrite(&mut module).unwrap();

        let events = sink.take();
        assert!(events.contains(&RewriteEvent::TitleUpdated {
            from: "Orig".into(),
            to: "New".into(),
        }));
        assert!(events.iter().any(|e| matches!(
            e,
            RewriteEvent::NameRewritten { kind: NodeKind::Field, to, .. }
                if to == "<New.Foo>k__BackingField"
        )));
    }

    #[test]
    fn test_unmapped_module_keeps_identity() {
        let mut module = ModuleDef::new("Other.dll", "Other");
        module.add_type(crate::metadata::types::TypeDef::new("Orig", "Foo"));
        let stats = rewrite(&mut module);

        assert_eq!(stats.total(), 1);
        assert_eq!(module.identity(), "Other");
        assert_eq!(module.types[TypeDefId(0).0].namespace, "New");
    }

    #[test]
    fn test_dangling_definitions_are_structural() {
        let table = RenameTable::from_pairs([("Orig", "New")]).unwrap();

        let mut module = orig_module();
        module.types[3].fields[0].field_type = TypeSig::class(TypeToken::Def(TypeDefId(42)));
        assert!(matches!(
            ModuleRewriter::new(&table, &NullSink).rewrite(&mut module),
            Err(crate::Error::Structural { .. })
        ));

        let mut module = orig_module();
        module.types[3].custom_attributes[0].constructor =
            crate::metadata::members::MethodRef::Def { owner: TypeDefId(77), index: 9 };
        assert!(matches!(
            ModuleRewriter::new(&table, &NullSink).rewrite(&mut module),
            Err(crate::Error::Structural { .. })
        ));

        let mut module = orig_module();
        module.exported_types[0].forwarded_to =
            Some(crate::metadata::token::AssemblyRefId(5));
        assert!(matches!(
            ModuleRewriter::new(&table, &NullSink).rewrite(&mut module),
            Err(crate::Error::Structural { .. })
        ));
    }

    #[test]
    fn test_stats_display() {
        let mut stats = RewriteStats::default();
        assert_eq!(stats.to_string(), "0 names");
        stats.record(NodeKind::Namespace);
        stats.record(NodeKind::Field);
        assert_eq!(stats.to_string(), "2 names (namespace: 1, field: 1)");
    }
}
