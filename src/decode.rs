use crate::registers::REGISTER_NAMES;
use crate::registry::{field_mask, OpcodeId, OperandKind, Registry};
use crate::AsmError;

/// Renders one host-order instruction word as an assembly line:
/// `opcode op0, op1, …`. The inverse of the encoder for every registered
/// instruction type.
pub fn decode_word(registry: &Registry, word: u32) -> Result<String, AsmError> {
    let id_bits = (word >> 26) & 0x3F;
    let ty = OpcodeId::from_word(id_bits)
        .and_then(|id| registry.instruction(id))
        .ok_or(AsmError::UnknownOpcodeId { id: id_bits, word })?;

    let mut line = ty.opcode.to_string();
    let mut position = 26u32;
    let mut emitted = 0usize;
    for op in &ty.operands {
        position -= op.bits;
        let value = (word >> position) & field_mask(op.bits);

        let rendered = match op.kind {
            OperandKind::Register => render_register(value),
            OperandKind::Immediate => render_immediate(value, op.bits),
        };
        let Some(rendered) = rendered else {
            continue;
        };
        line.push_str(if emitted == 0 { " " } else { ", " });
        line.push_str(&rendered);
        emitted += 1;
    }
    Ok(line)
}

fn render_register(value: u32) -> Option<String> {
    match REGISTER_NAMES.get(value as usize) {
        Some(name) => Some(name.to_string()),
        None => {
            tracing::warn!("register operand {value} is out of range, omitting");
            None
        }
    }
}

// Immediates print in hex; 8/16/32-bit fields are reinterpreted at their own
// signed width so negative values read as `-0x<abs>`.
fn render_immediate(value: u32, bits: u32) -> Option<String> {
    let signed = match bits {
        1 => return Some(format!("0x{value:X}")),
        8 => value as u8 as i8 as i64,
        16 => value as u16 as i16 as i64,
        32 => value as i32 as i64,
        _ => {
            tracing::warn!("immediate 0x{value:X} has unsupported width {bits}, omitting");
            return None;
        }
    };
    if signed < 0 {
        Some(format!("-0x{:X}", -signed))
    } else {
        Some(format!("0x{signed:X}"))
    }
}
