//! Member definitions and member references.

use serde::{Deserialize, Serialize};

use crate::metadata::{
    body::MethodBody,
    customattributes::CustomAttribute,
    signature::{MethodSig, TypeSig},
    token::{MemberRefId, MethodSpecId, TypeDefId},
    types::GenericParam,
};

/// A field defined by a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name, possibly compiler generated (`<Prop>k__BackingField`)
    pub name: String,
    /// `FieldAttributes` bitmask
    pub flags: u16,
    /// Type of the field
    pub field_type: TypeSig,
    /// Custom attributes attached to the field
    pub custom_attributes: Vec<CustomAttribute>,
}

impl FieldDef {
    /// Field without attributes
    pub fn new(name: impl Into<String>, field_type: TypeSig) -> Self {
        FieldDef {
            name: name.into(),
            flags: 0,
            field_type,
            custom_attributes: Vec::new(),
        }
    }
}

/// A named parameter of a method definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    /// 1-based position, 0 denotes the return value
    pub sequence: u16,
    /// Parameter name
    pub name: String,
    /// Custom attributes attached to the parameter
    pub custom_attributes: Vec<CustomAttribute>,
}

/// A method defined by a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    /// Method name. Explicit interface implementations carry the interface's full name as a
    /// prefix, `Namespace.IFoo.Method`
    pub name: String,
    /// `MethodAttributes` bitmask
    pub flags: u16,
    /// Return and parameter types
    pub signature: MethodSig,
    /// Parameter names and attributes
    pub params: Vec<ParamDef>,
    /// Generic parameters declared by the method
    pub generic_params: Vec<GenericParam>,
    /// Methods this method explicitly overrides (`MethodImpl`)
    pub overrides: Vec<MethodRef>,
    /// Custom attributes attached to the method
    pub custom_attributes: Vec<CustomAttribute>,
    /// IL body, absent for abstract, extern and runtime methods
    pub body: Option<MethodBody>,
}

impl MethodDef {
    /// Method without body, parameters or attributes
    pub fn new(name: impl Into<String>, signature: MethodSig) -> Self {
        MethodDef {
            name: name.into(),
            flags: 0,
            signature,
            params: Vec::new(),
            generic_params: Vec::new(),
            overrides: Vec::new(),
            custom_attributes: Vec::new(),
            body: None,
        }
    }

    /// Attach an IL body
    #[must_use]
    pub fn with_body(mut self, body: MethodBody) -> Self {
        self.body = Some(body);
        self
    }
}

/// A property defined by a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    /// Property name
    pub name: String,
    /// Property type
    pub property_type: TypeSig,
    /// Index of the getter in the declaring type's methods
    pub getter: Option<usize>,
    /// Index of the setter in the declaring type's methods
    pub setter: Option<usize>,
    /// Custom attributes attached to the property
    pub custom_attributes: Vec<CustomAttribute>,
}

impl PropertyDef {
    /// Property without accessors
    pub fn new(name: impl Into<String>, property_type: TypeSig) -> Self {
        PropertyDef {
            name: name.into(),
            property_type,
            getter: None,
            setter: None,
            custom_attributes: Vec::new(),
        }
    }
}

/// An event defined by a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDef {
    /// Event name
    pub name: String,
    /// Delegate type of the event
    pub event_type: TypeSig,
    /// Index of the add accessor in the declaring type's methods
    pub add: Option<usize>,
    /// Index of the remove accessor in the declaring type's methods
    pub remove: Option<usize>,
    /// Index of the raise accessor in the declaring type's methods
    pub raise: Option<usize>,
    /// Custom attributes attached to the event
    pub custom_attributes: Vec<CustomAttribute>,
}

impl EventDef {
    /// Event without accessors
    pub fn new(name: impl Into<String>, event_type: TypeSig) -> Self {
        EventDef {
            name: name.into(),
            event_type,
            add: None,
            remove: None,
            raise: None,
            custom_attributes: Vec::new(),
        }
    }
}

/// Signature of a member reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberSig {
    /// A field reference
    Field(TypeSig),
    /// A method reference
    Method(MethodSig),
}

/// A reference to a field or method, usually of a type defined elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRef {
    /// The type declaring the member
    pub parent: TypeSig,
    /// Member name
    pub name: String,
    /// Member signature
    pub signature: MemberSig,
}

/// An instantiation of a generic method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSpec {
    /// The generic method being instantiated
    pub method: MethodRef,
    /// Generic arguments
    pub instantiation: Vec<TypeSig>,
}

/// A `MethodDefOrRef`, or a method specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodRef {
    /// A method of a type defined in this module
    Def {
        /// The declaring type
        owner: TypeDefId,
        /// Index into the declaring type's methods
        index: usize,
    },
    /// A member reference
    Ref(MemberRefId),
    /// A generic method instantiation
    Spec(MethodSpecId),
}

/// A `FieldDefOrRef`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldRef {
    /// A field of a type defined in this module
    Def {
        /// The declaring type
        owner: TypeDefId,
        /// Index into the declaring type's fields
        index: usize,
    },
    /// A member reference
    Ref(MemberRefId),
}
