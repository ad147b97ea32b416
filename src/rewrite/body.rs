//! Method body rewriting.
//!
//! Only three instruction categories carry names: string loads, field accesses and calls.
//! Every other instruction is left as it is, so control flow and operand arity never
//! change.

use crate::{
    events::NodeKind,
    metadata::body::{MethodBody, OpCodeCategory, Operand},
    rename::Rule,
    rewrite::visitor::Visitor,
    Result,
};

/// Walk the instruction stream of `body` once.
pub(crate) fn visit_body(visitor: &mut Visitor<'_>, body: &mut MethodBody) -> Result<()> {
    for instruction in &mut body.instructions {
        match (instruction.opcode.category(), &mut instruction.operand) {
            (OpCodeCategory::StringLoad, Operand::String(literal)) => {
                visitor.rename(NodeKind::StringLiteral, literal, &Rule::LITERAL);
            }
            // Member reference names go through MEMBER_NAME, which covers backing fields
            (OpCodeCategory::FieldAccess, Operand::Field(field)) => {
                visitor.visit_field_ref(*field)?;
            }
            (OpCodeCategory::Call, Operand::Method(method)) => {
                visitor.visit_method_ref(*method)?;
            }
            (OpCodeCategory::StringLoad | OpCodeCategory::FieldAccess | OpCodeCategory::Call, operand) => {
                return Err(structural_error!(
                    "{} at IL_{:04x} has operand {:?}",
                    instruction.opcode,
                    instruction.offset,
                    operand
                ));
            }
            (OpCodeCategory::Other, _) => {}
        }
    }
    Ok(())
}
