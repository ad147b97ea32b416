//! Type definitions, type references and the nodes hanging directly off a type.

use serde::{Deserialize, Serialize};

use crate::metadata::{
    customattributes::CustomAttribute,
    members::{EventDef, FieldDef, MethodDef, PropertyDef},
    signature::TypeSig,
    token::{AssemblyRefId, TypeDefId, TypeRefId},
};

/// A type defined by the module.
///
/// Nested types are stored in the module's flat type arena like every other type. The
/// enclosing type lists them in [`TypeDef::nested_types`] and each nested type points back
/// through [`TypeDef::declaring_type`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    /// Namespace, empty for nested types
    pub namespace: String,
    /// Simple name
    pub name: String,
    /// `TypeAttributes` bitmask
    pub flags: u32,
    /// Base type, `None` for interfaces and `System.Object`
    pub base_type: Option<TypeSig>,
    /// Implemented interfaces
    pub interfaces: Vec<InterfaceImpl>,
    /// Generic parameters declared by this type
    pub generic_params: Vec<GenericParam>,
    /// Fields
    pub fields: Vec<FieldDef>,
    /// Methods, including property and event accessors
    pub methods: Vec<MethodDef>,
    /// Properties
    pub properties: Vec<PropertyDef>,
    /// Events
    pub events: Vec<EventDef>,
    /// Custom attributes attached to the type
    pub custom_attributes: Vec<CustomAttribute>,
    /// Enclosing type of a nested type
    pub declaring_type: Option<TypeDefId>,
    /// Types nested inside this one
    pub nested_types: Vec<TypeDefId>,
}

impl TypeDef {
    /// Create an empty type definition
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeDef {
            namespace: namespace.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// `Namespace.Name`, or just `Name` when the namespace is empty
    #[must_use]
    pub fn full_name(&self) -> String {
        full_name(&self.namespace, &self.name)
    }
}

/// Scope a type reference is resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionScope {
    /// The current module
    Module,
    /// Another assembly
    AssemblyRef(AssemblyRefId),
    /// The enclosing type of a nested type reference
    TypeRef(TypeRefId),
}

/// A reference to a type defined outside of this module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Namespace, empty for nested type references
    pub namespace: String,
    /// Simple name
    pub name: String,
    /// Where the type is defined
    pub scope: ResolutionScope,
}

impl TypeRef {
    /// Create a type reference
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        scope: ResolutionScope,
    ) -> Self {
        TypeRef {
            namespace: namespace.into(),
            name: name.into(),
            scope,
        }
    }

    /// `Namespace.Name`, or just `Name` when the namespace is empty
    #[must_use]
    pub fn full_name(&self) -> String {
        full_name(&self.namespace, &self.name)
    }
}

/// An interface implemented by a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceImpl {
    /// The implemented interface
    pub interface: TypeSig,
    /// Custom attributes attached to the implementation
    pub custom_attributes: Vec<CustomAttribute>,
}

impl InterfaceImpl {
    /// Interface implementation without attributes
    #[must_use]
    pub fn new(interface: TypeSig) -> Self {
        InterfaceImpl {
            interface,
            custom_attributes: Vec::new(),
        }
    }
}

/// A generic parameter of a type or method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericParam {
    /// Ordinal
    pub number: u16,
    /// Parameter name
    pub name: String,
    /// `GenericParamAttributes` bitmask
    pub flags: u16,
    /// Constraints placed on the parameter
    pub constraints: Vec<GenericParamConstraint>,
    /// Custom attributes attached to the parameter
    pub custom_attributes: Vec<CustomAttribute>,
}

impl GenericParam {
    /// Unconstrained generic parameter
    pub fn new(number: u16, name: impl Into<String>) -> Self {
        GenericParam {
            number,
            name: name.into(),
            flags: 0,
            constraints: Vec::new(),
            custom_attributes: Vec::new(),
        }
    }
}

/// A constraint on a generic parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericParamConstraint {
    /// The constraining type, which may mention the declaring type itself
    pub constraint: TypeSig,
    /// Custom attributes attached to the constraint
    pub custom_attributes: Vec<CustomAttribute>,
}

pub(crate) fn full_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}
