//! Type definition traversal.
//!
//! Types live in a flat arena. Nested types are reached from their declaring type and are
//! visited before it; a per-type memo keeps every type to a single visit and turns a nesting
//! cycle into a structural error.

use crate::{
    events::NodeKind,
    metadata::{
        members::MethodDef,
        token::TypeDefId,
        types::{GenericParam, TypeDef},
    },
    rename::Rule,
    rewrite::{
        attributes::visit_attributes,
        body::visit_body,
        visitor::{Memo, Visitor},
    },
    Result,
};

/// Visit every type definition of a module.
pub(crate) fn visit_types(visitor: &mut Visitor<'_>, types: &mut [TypeDef]) -> Result<()> {
    let mut memo = Memo::with_len(types.len());

    let top_level: Vec<TypeDefId> = types
        .iter()
        .enumerate()
        .filter(|(_, ty)| ty.declaring_type.is_none())
        .map(|(index, _)| TypeDefId(index))
        .collect();
    for id in top_level {
        visit_type(visitor, types, &mut memo, id)?;
    }

    // Nested types whose declaring type does not list them, and nesting cycles
    for index in memo.unvisited() {
        visit_type(visitor, types, &mut memo, TypeDefId(index))?;
    }
    Ok(())
}

fn visit_type(
    visitor: &mut Visitor<'_>,
    types: &mut [TypeDef],
    memo: &mut Memo,
    id: TypeDefId,
) -> Result<()> {
    if !memo.enter(id.0, "TypeDef")? {
        return Ok(());
    }

    let ty = types
        .get(id.0)
        .ok_or_else(|| structural_error!("TypeDef {} does not exist", id))?;
    if let Some(parent) = ty.declaring_type {
        if parent.0 >= types.len() {
            return Err(structural_error!(
                "TypeDef {} is nested in missing TypeDef {}",
                id,
                parent
            ));
        }
    }

    for nested in ty.nested_types.clone() {
        visit_type(visitor, types, memo, nested)?;
    }

    let ty = types
        .get_mut(id.0)
        .ok_or_else(|| structural_error!("TypeDef {} does not exist", id))?;
    visit_type_def(visitor, ty)?;

    memo.finish(id.0);
    Ok(())
}

fn visit_type_def(visitor: &mut Visitor<'_>, ty: &mut TypeDef) -> Result<()> {
    // 1. namespace, and the type's own name for compiler generated types
    visitor.rename(NodeKind::Namespace, &mut ty.namespace, &Rule::NAMESPACE);
    visitor.rename(NodeKind::TypeName, &mut ty.name, &Rule::SYNTHETIC);
    let owner = ty.full_name();

    if let Some(base) = &ty.base_type {
        visitor.visit_sig(base)?;
    }

    // 2. attributes on the type
    visit_attributes(visitor, &|| format!("type {owner}"), &mut ty.custom_attributes)?;

    // 3. methods
    let mut methods = Methods::new(&mut ty.methods, &owner);
    for index in 0..methods.len() {
        methods.visit(visitor, index)?;
    }

    // 4. properties and their accessors
    for property in &mut ty.properties {
        let name = property.name.clone();
        visit_attributes(
            visitor,
            &|| format!("property {owner}::{name}"),
            &mut property.custom_attributes,
        )?;
        visitor.visit_sig(&property.property_type)?;
        visitor.rename(NodeKind::Property, &mut property.name, &Rule::MEMBER_NAME);

        for accessor in [property.getter, property.setter].into_iter().flatten() {
            methods.visit(visitor, accessor)?;
        }
    }

    // 5. fields
    for field in &mut ty.fields {
        visitor.rename(NodeKind::Field, &mut field.name, &Rule::SYNTHETIC);
        let name = field.name.clone();
        visit_attributes(
            visitor,
            &|| format!("field {owner}::{name}"),
            &mut field.custom_attributes,
        )?;
        visitor.visit_sig(&field.field_type)?;
    }

    // 6. interfaces, events and generic parameters
    for interface in &mut ty.interfaces {
        visit_attributes(
            visitor,
            &|| format!("interface implementation on {owner}"),
            &mut interface.custom_attributes,
        )?;
        visitor.visit_sig(&interface.interface)?;
    }

    for event in &mut ty.events {
        let name = event.name.clone();
        visit_attributes(
            visitor,
            &|| format!("event {owner}::{name}"),
            &mut event.custom_attributes,
        )?;
        visitor.visit_sig(&event.event_type)?;
        visitor.rename(NodeKind::Event, &mut event.name, &Rule::MEMBER_NAME);

        for accessor in [event.add, event.remove, event.raise].into_iter().flatten() {
            methods.visit(visitor, accessor)?;
        }
    }

    for param in &mut ty.generic_params {
        visit_generic_param(visitor, &owner, param)?;
    }

    Ok(())
}

/// The methods of one type with a record of which ones were already visited.
///
/// Accessors are reached both as methods and through their property or event; a second
/// visit could apply another table entry to an already rewritten name.
struct Methods<'t> {
    methods: &'t mut [MethodDef],
    done: Vec<bool>,
    owner: &'t str,
}

impl<'t> Methods<'t> {
    fn new(methods: &'t mut [MethodDef], owner: &'t str) -> Self {
        Methods {
            done: vec![false; methods.len()],
            methods,
            owner,
        }
    }

    fn len(&self) -> usize {
        self.methods.len()
    }

    fn visit(&mut self, visitor: &mut Visitor<'_>, index: usize) -> Result<()> {
        let Some(method) = self.methods.get_mut(index) else {
            return Err(structural_error!(
                "{} has no method at index {}",
                self.owner,
                index
            ));
        };
        if self.done[index] {
            return Ok(());
        }
        self.done[index] = true;

        visit_method(visitor, self.owner, method)
    }
}

fn visit_method(visitor: &mut Visitor<'_>, owner: &str, method: &mut MethodDef) -> Result<()> {
    let name = method.name.clone();
    visit_attributes(
        visitor,
        &|| format!("method {owner}::{name}"),
        &mut method.custom_attributes,
    )?;

    // Explicit interface implementations are named after the interface: Orig.IFoo.Method
    visitor.rename(NodeKind::Method, &mut method.name, &Rule::MEMBER_NAME);

    for target in &method.overrides {
        visitor.visit_method_ref(*target)?;
    }

    let scope = format!("{owner}::{}", method.name);
    for param in &mut method.generic_params {
        visit_generic_param(visitor, &scope, param)?;
    }

    for param in &mut method.params {
        let param_name = param.name.clone();
        visit_attributes(
            visitor,
            &|| format!("parameter {param_name} of {scope}"),
            &mut param.custom_attributes,
        )?;
    }
    visitor.visit_method_sig(&method.signature)?;

    if let Some(body) = &mut method.body {
        visit_body(visitor, body)?;
        for local in &body.locals {
            visitor.visit_sig(local)?;
        }
        for handler in &body.exception_handlers {
            if let Some(catch_type) = &handler.catch_type {
                visitor.visit_sig(catch_type)?;
            }
        }
    }
    Ok(())
}

fn visit_generic_param(
    visitor: &mut Visitor<'_>,
    owner: &str,
    param: &mut GenericParam,
) -> Result<()> {
    visitor.rename(NodeKind::GenericParam, &mut param.name, &Rule::MEMBER_NAME);

    let name = param.name.clone();
    visit_attributes(
        visitor,
        &|| format!("generic parameter {name} of {owner}"),
        &mut param.custom_attributes,
    )?;

    for constraint in &mut param.constraints {
        visit_attributes(
            visitor,
            &|| format!("constraint on {name} of {owner}"),
            &mut constraint.custom_attributes,
        )?;
        visitor.visit_sig(&constraint.constraint)?;
    }
    Ok(())
}
