//! Custom attribute rewriting.
//!
//! An attribute names the identity through its constructor (the attribute type), through
//! type-valued arguments (`typeof(Orig.Foo)`) and through string arguments holding type or
//! member names (`"Orig.Foo, Orig"`).

use crate::{
    events::{NodeKind, RewriteEvent},
    metadata::{
        customattributes::{AttributeArgument, AttributeValue, CustomAttribute},
        members::MethodRef,
        token::TypeToken,
    },
    rename::Rule,
    rewrite::visitor::Visitor,
    Result,
};

/// Attribute types whose string argument is the descriptive title of the assembly
const TITLE_ATTRIBUTES: [&str; 2] = ["AssemblyTitleAttribute", "AssemblyDescriptionAttribute"];

/// Rewrite every attribute attached to `owner`.
pub(crate) fn visit_attributes(
    visitor: &mut Visitor<'_>,
    owner: &dyn Fn() -> String,
    attributes: &mut [CustomAttribute],
) -> Result<()> {
    for attribute in attributes {
        let before = visitor.stats.total();
        visit_attribute(visitor, attribute)?;

        let names = visitor.stats.total() - before;
        if names > 0 {
            visitor.emit(RewriteEvent::AttributeRewritten {
                owner: owner(),
                names,
            });
        }
    }
    Ok(())
}

/// Rewrite the assembly level attributes, updating the title and description.
pub(crate) fn visit_assembly_attributes(
    visitor: &mut Visitor<'_>,
    assembly: &str,
    attributes: &mut [CustomAttribute],
) -> Result<()> {
    for attribute in attributes.iter_mut() {
        if is_title(visitor, attribute)? {
            visit_title(visitor, attribute)?;
        } else {
            visit_attributes(
                visitor,
                &|| format!("assembly {assembly}"),
                std::slice::from_mut(attribute),
            )?;
        }
    }
    Ok(())
}

fn visit_attribute(visitor: &mut Visitor<'_>, attribute: &mut CustomAttribute) -> Result<()> {
    visit_constructor(visitor, attribute.constructor)?;

    for argument in &mut attribute.fixed_args {
        visit_argument(visitor, argument)?;
    }
    for named in &mut attribute.named_args {
        visit_argument(visitor, &mut named.argument)?;
    }
    Ok(())
}

/// The constructor reference carries the attribute type, which must be a type
fn visit_constructor(visitor: &mut Visitor<'_>, constructor: MethodRef) -> Result<()> {
    if let MethodRef::Ref(id) = constructor {
        let parent = &visitor.refs.member_ref(id)?.parent;
        if parent.element_type().tokens().is_empty() {
            return Err(structural_error!(
                "Attribute constructor {} is not declared on a type",
                id
            ));
        }
    }
    visitor.visit_method_ref(constructor)
}

fn visit_argument(visitor: &mut Visitor<'_>, argument: &mut AttributeArgument) -> Result<()> {
    visitor.visit_sig(&argument.arg_type)?;
    visit_value(visitor, &mut argument.value)
}

fn visit_value(visitor: &mut Visitor<'_>, value: &mut AttributeValue) -> Result<()> {
    match value {
        AttributeValue::String(text) => {
            visitor.rename(NodeKind::AttributeString, text, &Rule::LITERAL);
        }
        AttributeValue::Type(type_sig) => visitor.visit_sig(type_sig)?,
        AttributeValue::Array(items) => {
            for item in items {
                visit_argument(visitor, item)?;
            }
        }
        AttributeValue::Boxed(inner) => visit_argument(visitor, inner)?,
        AttributeValue::Null
        | AttributeValue::Bool(_)
        | AttributeValue::Char(_)
        | AttributeValue::Int(_)
        | AttributeValue::UInt(_)
        | AttributeValue::Float(_) => {}
    }
    Ok(())
}

fn is_title(visitor: &Visitor<'_>, attribute: &CustomAttribute) -> Result<bool> {
    let MethodRef::Ref(id) = attribute.constructor else {
        return Ok(false);
    };

    let parent = &visitor.refs.member_ref(id)?.parent;
    match parent.element_type().tokens().first() {
        Some(TypeToken::Ref(type_ref)) => {
            let type_ref = visitor.refs.type_ref(*type_ref)?;
            Ok(type_ref.namespace == "System.Reflection"
                && TITLE_ATTRIBUTES.contains(&type_ref.name.as_str()))
        }
        _ => Ok(false),
    }
}

fn visit_title(visitor: &mut Visitor<'_>, attribute: &mut CustomAttribute) -> Result<()> {
    visit_constructor(visitor, attribute.constructor)?;

    for argument in &mut attribute.fixed_args {
        if let AttributeValue::String(text) = &mut argument.value {
            if let Some(new) = visitor.table().rewrite(text, &Rule::TITLE) {
                let from = std::mem::replace(text, new.clone());
                visitor.stats.record(NodeKind::AttributeString);
                visitor.emit(RewriteEvent::TitleUpdated { from, to: new });
            }
        }
    }
    Ok(())
}
