//! # dotrename Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dotrename library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotrename operations
pub use crate::Error;

/// The result type used throughout dotrename
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Rewrite request, options and the resulting report
pub use crate::project::{ModuleReport, RewriteOptions, RewriteReport, RewriteRequest};

/// Module format seam and the bundled JSON image format
pub use crate::file::{JsonFormat, ModuleFormat};

// ================================================================================================
// Rewrite Engine
// ================================================================================================

/// Rename table and call-site rules
pub use crate::rename::{RenameTable, Rule};

/// Single module rewriter
pub use crate::rewrite::{ModuleRewriter, RewriteStats};

/// Events and sinks
pub use crate::events::{EventSink, LogSink, NodeKind, RewriteEvent, Verbosity};

// ================================================================================================
// Metadata Graph
// ================================================================================================

/// Module level structures
pub use crate::metadata::module::{
    AssemblyDef, AssemblyFlags, AssemblyRef, AssemblyVersion, ExportedType, ModuleDef,
    ModuleFlags, References,
};

/// Types, members and signatures
pub use crate::metadata::{
    AssemblyRefId, EventDef, FieldDef, FieldRef, GenericParam, InterfaceImpl, MemberRef,
    MemberRefId, MemberSig, MethodDef, MethodRef, MethodSig, MethodSpec, MethodSpecId, ParamDef,
    Primitive, PropertyDef, ResolutionScope, TypeDef, TypeDefId, TypeRef, TypeRefId, TypeSig,
    TypeToken,
};

/// Custom attributes
pub use crate::metadata::customattributes::{
    AttributeArgument, AttributeValue, CustomAttribute, NamedArgument,
};

/// Method bodies
pub use crate::metadata::body::{Instruction, MethodBody, OpCode, OpCodeCategory, Operand};
