//! Structural type and method signatures (ECMA-335 II.23.2).
//!
//! Signatures never carry names themselves. Every named type a signature mentions is reached
//! through a [`TypeToken`], so rewriting a signature means rewriting the table entries its
//! tokens point at.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::metadata::token::TypeToken;

/// Built-in element types that do not reference any metadata table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum Primitive {
    /// void
    Void,
    /// bool
    Boolean,
    /// char
    Char,
    /// signed 8bit integer
    I1,
    /// unsigned 8bit integer
    U1,
    /// signed 16bit integer
    I2,
    /// unsigned 16bit integer
    U2,
    /// signed 32bit integer
    I4,
    /// unsigned 32bit integer
    U4,
    /// signed 64bit integer
    I8,
    /// unsigned 64bit integer
    U8,
    /// 32bit floating-point
    R4,
    /// 64bit floating-point
    R8,
    /// signed integer, sized to executing platform
    I,
    /// unsigned integer, sized to executing platform
    U,
    /// System.String
    String,
    /// System.Object
    Object,
    /// Type is referenced during runtime
    TypedByRef,
}

/// A type signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeSig {
    /// A built-in element type
    Primitive(Primitive),
    /// CIL Class
    Class(TypeToken),
    /// CIL value-type
    ValueType(TypeToken),
    /// Generic type and its arguments
    GenericInst {
        /// The open generic type
        base: TypeToken,
        /// Whether the generic type is a value type
        value_type: bool,
        /// The type arguments
        args: Vec<TypeSig>,
    },
    /// Generic type parameter, by ordinal
    GenericParam(u32),
    /// Generic method parameter, by ordinal
    MethodGenericParam(u32),
    /// Single dimension array
    SzArray(Box<TypeSig>),
    /// Multi dimensional array
    Array {
        /// The type in the array
        base: Box<TypeSig>,
        /// The number of dimensions
        rank: u32,
    },
    /// A pointer to a type
    Ptr(Box<TypeSig>),
    /// Type by reference
    ByRef(Box<TypeSig>),
    /// A pinned type
    Pinned(Box<TypeSig>),
    /// Type carrying a required or optional custom modifier
    Modified {
        /// `modreq` when true, `modopt` otherwise
        required: bool,
        /// The modifier type
        modifier: TypeToken,
        /// The modified type
        base: Box<TypeSig>,
    },
    /// Function pointer
    FnPtr(Box<MethodSig>),
}

impl TypeSig {
    /// Shorthand for a class signature
    #[must_use]
    pub fn class(token: TypeToken) -> Self {
        TypeSig::Class(token)
    }

    /// Shorthand for a generic instantiation of a class
    #[must_use]
    pub fn generic(base: TypeToken, args: Vec<TypeSig>) -> Self {
        TypeSig::GenericInst {
            base,
            value_type: false,
            args,
        }
    }

    /// Reduce a type specification to its element type.
    ///
    /// Arrays, pointers, by-refs, pinned and modified types are unwrapped until a type that
    /// stands for itself is reached. Generic instantiations are element types: their arguments
    /// are reached through [`TypeSig::tokens`].
    #[must_use]
    pub fn element_type(&self) -> &TypeSig {
        let mut current = self;
        loop {
            current = match current {
                TypeSig::SzArray(base)
                | TypeSig::Array { base, .. }
                | TypeSig::Ptr(base)
                | TypeSig::ByRef(base)
                | TypeSig::Pinned(base)
                | TypeSig::Modified { base, .. } => &**base,
                _ => return current,
            };
        }
    }

    /// Collect every type token reachable from this signature.
    ///
    /// Specifications are reduced to their element type first, so the element type's token
    /// precedes the tokens of its generic arguments. Custom modifiers follow the type they
    /// modify.
    #[must_use]
    pub fn tokens(&self) -> Vec<TypeToken> {
        let mut tokens = Vec::new();
        self.collect_tokens(&mut tokens);
        tokens
    }

    fn collect_tokens(&self, out: &mut Vec<TypeToken>) {
        match self {
            TypeSig::Class(token) | TypeSig::ValueType(token) => out.push(*token),
            TypeSig::GenericInst { base, args, .. } => {
                out.push(*base);
                for arg in args {
                    arg.collect_tokens(out);
                }
            }
            TypeSig::SzArray(base)
            | TypeSig::Array { base, .. }
            | TypeSig::Ptr(base)
            | TypeSig::ByRef(base)
            | TypeSig::Pinned(base) => base.collect_tokens(out),
            TypeSig::Modified { modifier, base, .. } => {
                base.collect_tokens(out);
                out.push(*modifier);
            }
            TypeSig::FnPtr(method) => method.collect_tokens(out),
            TypeSig::Primitive(_) | TypeSig::GenericParam(_) | TypeSig::MethodGenericParam(_) => {}
        }
    }
}

/// Represents a method signature (II.23.2.1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSig {
    /// Used to encode the keyword instance in the calling convention, see §II.15.3
    pub has_this: bool,
    /// Number of generic parameters declared by the method
    pub generic_param_count: u32,
    /// The return type of this `Method`
    pub return_type: TypeSig,
    /// The parameters of this `Method`
    pub params: Vec<TypeSig>,
}

impl MethodSig {
    /// An instance method signature
    #[must_use]
    pub fn instance(return_type: TypeSig, params: Vec<TypeSig>) -> Self {
        MethodSig {
            has_this: true,
            generic_param_count: 0,
            return_type,
            params,
        }
    }

    /// A static method signature
    #[must_use]
    pub fn static_method(return_type: TypeSig, params: Vec<TypeSig>) -> Self {
        MethodSig {
            has_this: false,
            generic_param_count: 0,
            return_type,
            params,
        }
    }

    /// Collect every type token reachable from the return type and the parameters.
    #[must_use]
    pub fn tokens(&self) -> Vec<TypeToken> {
        let mut tokens = Vec::new();
        self.collect_tokens(&mut tokens);
        tokens
    }

    fn collect_tokens(&self, out: &mut Vec<TypeToken>) {
        self.return_type.collect_tokens(out);
        for param in &self.params {
            param.collect_tokens(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::token::{TypeDefId, TypeRefId};

    #[test]
    fn test_element_type_strips_specifications() {
        let inner = TypeSig::Class(TypeToken::Ref(TypeRefId(0)));
        let sig = TypeSig::ByRef(Box::new(TypeSig::SzArray(Box::new(TypeSig::Ptr(Box::new(
            inner.clone(),
        ))))));

        assert_eq!(sig.element_type(), &inner);
    }

    #[test]
    fn test_tokens_visit_generic_arguments() {
        let sig = TypeSig::SzArray(Box::new(TypeSig::generic(
            TypeToken::Ref(TypeRefId(0)),
            vec![
                TypeSig::Class(TypeToken::Def(TypeDefId(1))),
                TypeSig::generic(
                    TypeToken::Ref(TypeRefId(2)),
                    vec![TypeSig::ValueType(TypeToken::Ref(TypeRefId(3)))],
                ),
            ],
        )));

        assert_eq!(
            sig.tokens(),
            vec![
                TypeToken::Ref(TypeRefId(0)),
                TypeToken::Def(TypeDefId(1)),
                TypeToken::Ref(TypeRefId(2)),
                TypeToken::Ref(TypeRefId(3)),
            ]
        );
    }

    #[test]
    fn test_tokens_include_modifiers() {
        let sig = TypeSig::SzArray(Box::new(TypeSig::Modified {
            required: true,
            modifier: TypeToken::Ref(TypeRefId(7)),
            base: Box::new(TypeSig::Primitive(Primitive::I4)),
        }));

        assert_eq!(sig.tokens(), vec![TypeToken::Ref(TypeRefId(7))]);
    }

    #[test]
    fn test_method_sig_tokens() {
        let sig = MethodSig::static_method(
            TypeSig::Class(TypeToken::Ref(TypeRefId(0))),
            vec![
                TypeSig::Primitive(Primitive::String),
                TypeSig::FnPtr(Box::new(MethodSig::static_method(
                    TypeSig::Primitive(Primitive::Void),
                    vec![TypeSig::Class(TypeToken::Def(TypeDefId(0)))],
                ))),
            ],
        );

        assert_eq!(
            sig.tokens(),
            vec![TypeToken::Ref(TypeRefId(0)), TypeToken::Def(TypeDefId(0))]
        );
    }

    #[test]
    fn test_primitive_display() {
        assert_eq!(Primitive::TypedByRef.to_string(), "typedbyref");
        assert_eq!("i4".parse::<Primitive>().unwrap(), Primitive::I4);
    }
}
