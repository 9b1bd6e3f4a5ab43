use crate::context::AsmContext;
use crate::operand::{parse_operand_list, split_opcode};
use crate::registry::{Instr, InstrType, Registry};
use crate::AsmError;

/// Encodes one cleaned executable line into a host-order instruction word.
/// Macros are staged against their base layout, expanded, then packed like
/// any direct instruction.
pub fn encode_line(ctx: &AsmContext, registry: &Registry, clean: &str) -> Result<u32, AsmError> {
    if clean.is_empty() {
        return Err(AsmError::IgnoreLine {
            reason: "no tokens left after cleanup".to_string(),
        });
    }

    let (opcode, operand_text) = split_opcode(clean);
    let (values, raw) = parse_operand_list(ctx, operand_text)?;

    if let Some(ty) = registry.instruction_by_name(opcode) {
        let instr = Instr::new(ty, values, raw);
        return pack_word(ty, &instr);
    }

    let mac = registry
        .macro_by_name(opcode)
        .ok_or_else(|| AsmError::UnknownOpcode {
            opcode: opcode.to_string(),
        })?;
    let base = registry
        .instruction(mac.base)
        .ok_or_else(|| AsmError::UnknownOpcode {
            opcode: opcode.to_string(),
        })?;

    let staged = Instr::new(base, values, raw.clone());
    let expanded = (mac.expand)(ctx, &staged)?;
    let instr = Instr::new(base, expanded, raw);
    pack_word(base, &instr)
}

/// Packs masked operand values into the word: bit position runs from 6
/// downwards through the layout, the opcode id lands in the top 6 bits.
pub fn pack_word(ty: &InstrType, instr: &Instr) -> Result<u32, AsmError> {
    if instr.values.len() != ty.operands.len() {
        return Err(AsmError::OperandArity {
            expected: ty.operands.len(),
            found: instr.values.len(),
        });
    }

    let mut word = 0u32;
    let mut position = 6u32;
    for (op, &value) in ty.operands.iter().zip(&instr.values) {
        word |= value << (32 - op.bits - position);
        position += op.bits;
    }
    Ok(((ty.id as u32) << 26) | word)
}
