use serde::{Deserialize, Serialize};

use crate::metadata::{
    members::MethodRef,
    signature::{Primitive, TypeSig},
};

/// A custom attribute attached to a metadata node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomAttribute {
    /// The attribute constructor. Its declaring type is the attribute type
    pub constructor: MethodRef,
    /// Fixed arguments from the constructor signature
    pub fixed_args: Vec<AttributeArgument>,
    /// Named arguments (fields and properties)
    pub named_args: Vec<NamedArgument>,
}

impl CustomAttribute {
    /// Attribute instance without arguments
    #[must_use]
    pub fn new(constructor: MethodRef) -> Self {
        CustomAttribute {
            constructor,
            fixed_args: Vec::new(),
            named_args: Vec::new(),
        }
    }

    /// Append a fixed argument
    #[must_use]
    pub fn with_arg(mut self, arg: AttributeArgument) -> Self {
        self.fixed_args.push(arg);
        self
    }

    /// Append a named argument
    #[must_use]
    pub fn with_named(mut self, named: NamedArgument) -> Self {
        self.named_args.push(named);
        self
    }
}

/// A single typed custom attribute argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeArgument {
    /// Declared type of the argument, an enum type for enum arguments
    pub arg_type: TypeSig,
    /// Decoded value
    pub value: AttributeValue,
}

impl AttributeArgument {
    /// A `string` argument
    pub fn string(value: impl Into<String>) -> Self {
        AttributeArgument {
            arg_type: TypeSig::Primitive(Primitive::String),
            value: AttributeValue::String(value.into()),
        }
    }

    /// A `System.Type` argument. `type_sig` is the declared type of the argument, `value` the
    /// referenced type
    #[must_use]
    pub fn type_of(type_sig: TypeSig, value: TypeSig) -> Self {
        AttributeArgument {
            arg_type: type_sig,
            value: AttributeValue::Type(value),
        }
    }
}

/// Value of a custom attribute argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// A null string, type or array
    Null,
    /// Boolean value
    Bool(bool),
    /// Character value (16-bit Unicode)
    Char(char),
    /// Any signed integer, including enum values
    Int(i64),
    /// Any unsigned integer
    UInt(u64),
    /// Floating point value
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Type reference
    Type(TypeSig),
    /// Array of arguments
    Array(Vec<AttributeArgument>),
    /// An argument boxed into `object`
    Boxed(Box<AttributeArgument>),
}

/// A named argument (field or property) of a custom attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedArgument {
    /// Whether this is a field (true) or property (false)
    pub is_field: bool,
    /// Name of the field or property
    pub name: String,
    /// The assigned value
    pub argument: AttributeArgument,
}
