//! Shared traversal state: the reference tables, their visitation memo and the rename hook.

use std::mem;

use crate::{
    events::{EventSink, NodeKind, RewriteEvent},
    metadata::{
        members::{FieldRef, MemberSig, MethodRef},
        module::References,
        signature::{MethodSig, TypeSig},
        token::{AssemblyRefId, MemberRefId, MethodSpecId, TypeDefId, TypeRefId, TypeToken},
        types::{ResolutionScope, TypeDef},
    },
    rename::{RenameTable, Rule},
    rewrite::RewriteStats,
    Result,
};

/// Visitation state of one table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum VisitState {
    #[default]
    Unvisited,
    InProgress,
    Done,
}

/// Memo for a single table.
#[derive(Debug, Default)]
pub(crate) struct Memo {
    states: Vec<VisitState>,
}

impl Memo {
    pub(crate) fn with_len(len: usize) -> Self {
        Memo {
            states: vec![VisitState::Unvisited; len],
        }
    }

    /// Mark `index` as in progress. Returns `false` if it is already done; re-entering an
    /// entry that is still in progress is a cycle.
    pub(crate) fn enter(&mut self, index: usize, what: &str) -> Result<bool> {
        match self.states.get(index).copied() {
            Some(VisitState::Unvisited) => {
                self.states[index] = VisitState::InProgress;
                Ok(true)
            }
            Some(VisitState::Done) => Ok(false),
            Some(VisitState::InProgress) => {
                Err(structural_error!("{} {} refers back to itself", what, index))
            }
            None => Err(structural_error!("{} {} does not exist", what, index)),
        }
    }

    pub(crate) fn finish(&mut self, index: usize) {
        if let Some(state) = self.states.get_mut(index) {
            *state = VisitState::Done;
        }
    }

    /// Indices never entered
    pub(crate) fn unvisited(&self) -> Vec<usize> {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == VisitState::Unvisited)
            .map(|(index, _)| index)
            .collect()
    }
}

/// Method and field counts of every type definition.
///
/// Definition tokens are never renamed through the visitor, but they must still point at
/// something.
#[derive(Debug, Clone, Default)]
pub(crate) struct DefShape {
    /// `(methods, fields)` per type
    members: Vec<(usize, usize)>,
}

impl DefShape {
    pub(crate) fn of(types: &[TypeDef]) -> Self {
        DefShape {
            members: types
                .iter()
                .map(|ty| (ty.methods.len(), ty.fields.len()))
                .collect(),
        }
    }

    fn check_type(&self, id: TypeDefId) -> Result<(usize, usize)> {
        self.members
            .get(id.0)
            .copied()
            .ok_or_else(|| structural_error!("TypeDef {} does not exist", id))
    }

    fn check_method(&self, owner: TypeDefId, index: usize) -> Result<()> {
        let (methods, _) = self.check_type(owner)?;
        if index >= methods {
            return Err(structural_error!("TypeDef {} has no method {}", owner, index));
        }
        Ok(())
    }

    fn check_field(&self, owner: TypeDefId, index: usize) -> Result<()> {
        let (_, fields) = self.check_type(owner)?;
        if index >= fields {
            return Err(structural_error!("TypeDef {} has no field {}", owner, index));
        }
        Ok(())
    }
}

/// Traversal context for one module.
///
/// Holds the module's reference tables exclusively; type definitions are borrowed separately
/// by the type traversal so both can be mutated at once.
pub(crate) struct Visitor<'a> {
    table: &'a RenameTable,
    sink: &'a dyn EventSink,
    pub(crate) refs: &'a mut References,
    type_refs: Memo,
    member_refs: Memo,
    method_specs: Memo,
    defs: DefShape,
    pub(crate) stats: RewriteStats,
}

impl<'a> Visitor<'a> {
    pub(crate) fn new(
        table: &'a RenameTable,
        sink: &'a dyn EventSink,
        refs: &'a mut References,
    ) -> Self {
        Visitor {
            table,
            sink,
            type_refs: Memo::with_len(refs.type_refs.len()),
            member_refs: Memo::with_len(refs.member_refs.len()),
            method_specs: Memo::with_len(refs.method_specs.len()),
            refs,
            defs: DefShape::default(),
            stats: RewriteStats::default(),
        }
    }

    /// Check definition tokens against `defs`. Without it every definition token is dangling.
    pub(crate) fn with_defs(mut self, defs: DefShape) -> Self {
        self.defs = defs;
        self
    }

    /// Fail unless `id` names an assembly reference of the module
    pub(crate) fn check_assembly_ref(&self, id: AssemblyRefId) -> Result<()> {
        self.refs.assembly_ref(id).map(|_| ())
    }

    pub(crate) fn table(&self) -> &RenameTable {
        self.table
    }

    pub(crate) fn emit(&self, event: RewriteEvent) {
        self.sink.emit(event);
    }

    /// Rewrite `name` in place under `rule`, reporting the change
    pub(crate) fn rename(&mut self, kind: NodeKind, name: &mut String, rule: &Rule) -> bool {
        let Some(new) = self.table.rewrite(name, rule) else {
            return false;
        };

        let from = mem::replace(name, new.clone());
        self.stats.record(kind);
        self.sink.emit(RewriteEvent::NameRewritten { kind, from, to: new });
        true
    }

    /// Visit every type token a signature mentions
    pub(crate) fn visit_sig(&mut self, sig: &TypeSig) -> Result<()> {
        for token in sig.tokens() {
            self.visit_type_token(token)?;
        }
        Ok(())
    }

    pub(crate) fn visit_method_sig(&mut self, sig: &MethodSig) -> Result<()> {
        for token in sig.tokens() {
            self.visit_type_token(token)?;
        }
        Ok(())
    }

    /// Definitions are renamed where they are declared, only references need visiting here
    pub(crate) fn visit_type_token(&mut self, token: TypeToken) -> Result<()> {
        match token {
            TypeToken::Def(id) => self.defs.check_type(id).map(|_| ()),
            TypeToken::Ref(id) => self.visit_type_ref(id),
        }
    }

    /// Rename a type reference, then walk up to its declaring type for nested references.
    pub(crate) fn visit_type_ref(&mut self, id: TypeRefId) -> Result<()> {
        if !self.type_refs.enter(id.0, "TypeRef")? {
            return Ok(());
        }

        let scope = {
            let table = self.table;
            let sink = self.sink;
            let type_ref = self.refs.type_ref_mut(id)?;
            let mut renames = Vec::new();

            if let Some(new) = table.rewrite(&type_ref.namespace, &Rule::NAMESPACE) {
                let from = mem::replace(&mut type_ref.namespace, new.clone());
                renames.push((NodeKind::TypeRefNamespace, from, new));
            }
            if let Some(new) = table.rewrite(&type_ref.name, &Rule::SYNTHETIC) {
                let from = mem::replace(&mut type_ref.name, new.clone());
                renames.push((NodeKind::TypeRefName, from, new));
            }

            for (kind, from, to) in renames {
                self.stats.record(kind);
                sink.emit(RewriteEvent::NameRewritten { kind, from, to });
            }
            type_ref.scope
        };

        match scope {
            ResolutionScope::TypeRef(parent) => self.visit_type_ref(parent)?,
            ResolutionScope::AssemblyRef(assembly) => self.check_assembly_ref(assembly)?,
            ResolutionScope::Module => {}
        }

        self.type_refs.finish(id.0);
        Ok(())
    }

    /// Rename a member reference and every type its parent and signature mention.
    pub(crate) fn visit_member_ref(&mut self, id: MemberRefId) -> Result<()> {
        if !self.member_refs.enter(id.0, "MemberRef")? {
            return Ok(());
        }

        let tokens = {
            let member_ref = self.refs.member_ref(id)?;
            let mut tokens = member_ref.parent.tokens();
            match &member_ref.signature {
                MemberSig::Field(field_type) => tokens.extend(field_type.tokens()),
                MemberSig::Method(method) => tokens.extend(method.tokens()),
            }
            tokens
        };
        for token in tokens {
            self.visit_type_token(token)?;
        }

        let mut name = mem::take(&mut self.refs.member_ref_mut(id)?.name);
        self.rename(NodeKind::MemberRef, &mut name, &Rule::MEMBER_NAME);
        self.refs.member_ref_mut(id)?.name = name;

        self.member_refs.finish(id.0);
        Ok(())
    }

    /// Visit a generic method instantiation: the instantiated method and every argument.
    pub(crate) fn visit_method_spec(&mut self, id: MethodSpecId) -> Result<()> {
        if !self.method_specs.enter(id.0, "MethodSpec")? {
            return Ok(());
        }

        let (method, tokens) = {
            let spec = self.refs.method_spec(id)?;
            let tokens: Vec<TypeToken> =
                spec.instantiation.iter().flat_map(TypeSig::tokens).collect();
            (spec.method, tokens)
        };

        if let MethodRef::Spec(_) = method {
            return Err(structural_error!(
                "MethodSpec {} instantiates another MethodSpec",
                id
            ));
        }
        self.visit_method_ref(method)?;
        for token in tokens {
            self.visit_type_token(token)?;
        }

        self.method_specs.finish(id.0);
        Ok(())
    }

    pub(crate) fn visit_method_ref(&mut self, method: MethodRef) -> Result<()> {
        match method {
            MethodRef::Def { owner, index } => self.defs.check_method(owner, index),
            MethodRef::Ref(id) => self.visit_member_ref(id),
            MethodRef::Spec(id) => self.visit_method_spec(id),
        }
    }

    pub(crate) fn visit_field_ref(&mut self, field: FieldRef) -> Result<()> {
        match field {
            FieldRef::Def { owner, index } => self.defs.check_field(owner, index),
            FieldRef::Ref(id) => self.visit_member_ref(id),
        }
    }

    /// Visit every reference entry the traversal did not reach.
    ///
    /// Entries only used by locals, catch clauses or by instructions the body rewriter leaves
    /// alone are shared with nothing else, but they still name the identity.
    pub(crate) fn sweep(&mut self) -> Result<()> {
        for index in self.type_refs.unvisited() {
            self.visit_type_ref(TypeRefId(index))?;
        }
        for index in self.member_refs.unvisited() {
            self.visit_member_ref(MemberRefId(index))?;
        }
        for index in self.method_specs.unvisited() {
            self.visit_method_spec(MethodSpecId(index))?;
        }
        Ok(())
    }
}
