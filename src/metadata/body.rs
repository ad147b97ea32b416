//! Method bodies as a linear instruction sequence.
//!
//! Only operands that can carry a name are modelled in detail: string literals, field and
//! method references, and type tokens. Everything else is an opaque immediate the rewrite
//! never touches.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::metadata::{
    members::{FieldRef, MethodRef},
    signature::{MethodSig, TypeSig},
};

/// Categorization of instructions by what their operand names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum OpCodeCategory {
    /// Loads a string literal (`ldstr`)
    StringLoad,
    /// Loads or stores a field, or its address
    FieldAccess,
    /// Calls, constructs or takes the address of a method
    Call,
    /// Anything else
    Other,
}

/// CIL opcodes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[allow(missing_docs)]
pub enum OpCode {
    Nop,
    Ret,
    Pop,
    Dup,
    Ldnull,
    Ldarg,
    Starg,
    Ldloc,
    Stloc,
    #[strum(serialize = "ldc.i4")]
    LdcI4,
    #[strum(serialize = "ldc.i8")]
    LdcI8,
    #[strum(serialize = "ldc.r8")]
    LdcR8,
    Ldstr,
    Ldfld,
    Ldflda,
    Stfld,
    Ldsfld,
    Ldsflda,
    Stsfld,
    Call,
    Callvirt,
    Calli,
    Newobj,
    Jmp,
    Ldftn,
    Ldvirtftn,
    Br,
    Brtrue,
    Brfalse,
    Beq,
    Switch,
    Leave,
    Throw,
    Rethrow,
    Endfinally,
    Ldtoken,
    Castclass,
    Isinst,
    Box,
    #[strum(serialize = "unbox.any")]
    UnboxAny,
    Newarr,
    Ldelem,
    Stelem,
    Initobj,
    Sizeof,
    Constrained,
    Add,
    Sub,
    Ceq,
}

impl OpCode {
    /// Classify the opcode by the kind of operand it consumes
    #[must_use]
    pub fn category(self) -> OpCodeCategory {
        match self {
            OpCode::Ldstr => OpCodeCategory::StringLoad,
            OpCode::Ldfld
            | OpCode::Ldflda
            | OpCode::Stfld
            | OpCode::Ldsfld
            | OpCode::Ldsflda
            | OpCode::Stsfld => OpCodeCategory::FieldAccess,
            OpCode::Call
            | OpCode::Callvirt
            | OpCode::Newobj
            | OpCode::Jmp
            | OpCode::Ldftn
            | OpCode::Ldvirtftn => OpCodeCategory::Call,
            _ => OpCodeCategory::Other,
        }
    }

    /// The textual mnemonic, e.g. `ldstr` or `unbox.any`
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        self.into()
    }
}

/// Instruction operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    /// No operand present
    None,
    /// 32-bit immediate
    Int32(i32),
    /// 64-bit immediate
    Int64(i64),
    /// Floating point immediate
    Float64(f64),
    /// User string literal
    String(String),
    /// Field token
    Field(FieldRef),
    /// Method token
    Method(MethodRef),
    /// Type token
    Type(TypeSig),
    /// Stand-alone call site signature (`calli`)
    Signature(MethodSig),
    /// Branch target offset
    Branch(u32),
    /// Switch table targets
    Switch(Vec<u32>),
    /// Local variable index
    Local(u16),
    /// Method argument index
    Argument(u16),
}

/// A single instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Offset of the instruction within the body
    pub offset: u32,
    /// The opcode
    pub opcode: OpCode,
    /// The operand
    pub operand: Operand,
}

impl Instruction {
    /// Create an instruction at `offset`
    #[must_use]
    pub fn new(offset: u32, opcode: OpCode, operand: Operand) -> Self {
        Instruction {
            offset,
            opcode,
            operand,
        }
    }
}

/// Kind of an exception handling clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum HandlerKind {
    Catch,
    Filter,
    Finally,
    Fault,
}

/// An exception handling clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionHandler {
    /// Clause kind
    pub kind: HandlerKind,
    /// First instruction offset of the protected region
    pub try_start: u32,
    /// Offset just past the protected region
    pub try_end: u32,
    /// First instruction offset of the handler
    pub handler_start: u32,
    /// Offset just past the handler
    pub handler_end: u32,
    /// Caught exception type for `Catch` clauses
    pub catch_type: Option<TypeSig>,
}

/// The IL body of a method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodBody {
    /// Maximum evaluation stack depth
    pub max_stack: u16,
    /// Zero-initialise locals
    pub init_locals: bool,
    /// Local variable types
    pub locals: Vec<TypeSig>,
    /// Instructions in offset order
    pub instructions: Vec<Instruction>,
    /// Exception handling clauses
    pub exception_handlers: Vec<ExceptionHandler>,
}

impl MethodBody {
    /// A body consisting of `instructions`
    #[must_use]
    pub fn new(instructions: Vec<Instruction>) -> Self {
        MethodBody {
            max_stack: 8,
            instructions,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_mnemonics() {
        assert_eq!(OpCode::UnboxAny.mnemonic(), "unbox.any");
        assert_eq!(OpCode::LdcI4.to_string(), "ldc.i4");
        assert_eq!("ldsflda".parse::<OpCode>().unwrap(), OpCode::Ldsflda);
    }

    #[test]
    fn test_categories() {
        let strings: Vec<_> = OpCode::iter()
            .filter(|op| op.category() == OpCodeCategory::StringLoad)
            .collect();
        assert_eq!(strings, vec![OpCode::Ldstr]);

        let fields = OpCode::iter()
            .filter(|op| op.category() == OpCodeCategory::FieldAccess)
            .count();
        assert_eq!(fields, 6);

        assert_eq!(OpCode::Newobj.category(), OpCodeCategory::Call);
        assert_eq!(OpCode::Ldtoken.category(), OpCodeCategory::Other);
        assert_eq!(OpCode::Calli.category(), OpCodeCategory::Other);
    }
}
