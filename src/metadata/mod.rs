//! In-memory metadata graph.
//!
//! # Key Components
//!
//! - [`module::ModuleDef`] - One loaded module with its assembly manifest
//! - [`module::References`] - Shared assembly, type and member reference tables
//! - [`types::TypeDef`] - Type definitions, kept in a flat arena with nesting links
//! - [`members`] - Fields, methods, properties, events and member references
//! - [`signature::TypeSig`] - Structural signatures pointing into the tables
//! - [`customattributes`] - Decoded custom attributes
//! - [`body`] - Method bodies
//! - [`identity`] - Strong name helpers
//!
//! # Graph Shape
//!
//! Names only ever live in table entries: type definitions, type references, member
//! definitions and member references. Signatures, attribute arguments and instruction
//! operands point into those tables through typed indices ([`token`]). The graph contains
//! cycles (a nested type and its declaring type, a generic constraint naming the type that
//! declares the parameter) but every cycle passes through an index, never through ownership.

pub mod body;
pub mod customattributes;
pub mod identity;
pub mod members;
pub mod module;
pub mod signature;
pub mod token;
pub mod types;

pub use members::{
    EventDef, FieldDef, FieldRef, MemberRef, MemberSig, MethodDef, MethodRef, MethodSpec,
    ParamDef, PropertyDef,
};
pub use signature::{MethodSig, Primitive, TypeSig};
pub use token::{AssemblyRefId, MemberRefId, MethodSpecId, Token, TypeDefId, TypeRefId, TypeToken};
pub use types::{GenericParam, GenericParamConstraint, InterfaceImpl, ResolutionScope, TypeDef, TypeRef};
