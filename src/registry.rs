use std::collections::HashMap;

use crate::context::AsmContext;
use crate::registers::{Cond, Reg};
use crate::AsmError;

/// Instruction opcodes; the value occupies bits 31..26 of an encoded word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeId {
    Liw = 1,
    Addi = 2,
    Add = 3,
    Mov = 4,
    Cmpr = 5,
    Cmpi = 6,
    Jmpcr = 7,
    Jmp = 8,
    Nop = 63,
}

impl OpcodeId {
    /// Maps a 6-bit opcode field back to an identity.
    pub fn from_word(bits: u32) -> Option<OpcodeId> {
        match bits {
            1 => Some(OpcodeId::Liw),
            2 => Some(OpcodeId::Addi),
            3 => Some(OpcodeId::Add),
            4 => Some(OpcodeId::Mov),
            5 => Some(OpcodeId::Cmpr),
            6 => Some(OpcodeId::Cmpi),
            7 => Some(OpcodeId::Jmpcr),
            8 => Some(OpcodeId::Jmp),
            63 => Some(OpcodeId::Nop),
            _ => None,
        }
    }
}

/// Pseudo-opcodes; never encoded directly, each expands to a base instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroId {
    Inc,
    Liwl,
    Liwh,
    Jmpeq,
    Jmpl,
    Jmpleq,
    Jmpg,
    Jmpgeq,
    Labreg,
    Labjmp,
    Ret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    Register,
    Immediate,
}

#[derive(Debug, Clone, Copy)]
pub struct Operand {
    pub kind: OperandKind,
    pub bits: u32,
}

#[derive(Debug, Clone)]
pub struct InstrType {
    pub opcode: &'static str,
    pub id: OpcodeId,
    pub operands: Vec<Operand>,
}

/// Computes the concrete operand vector for a macro from the staged
/// instance (the macro's textual operands parsed against the base layout).
pub type MacroExpander = fn(&AsmContext, &Instr) -> Result<Vec<u32>, AsmError>;

pub struct MacroType {
    pub opcode: &'static str,
    pub id: MacroId,
    pub base: OpcodeId,
    pub expand: MacroExpander,
}

/// One parsed executable line. Operand values are masked to their field
/// widths at construction; values past the declared arity are kept so the
/// arity check still sees the real count.
#[derive(Debug, Clone)]
pub struct Instr {
    pub id: OpcodeId,
    pub values: Vec<u32>,
    pub raw: Vec<String>,
}

pub fn field_mask(bits: u32) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

impl Instr {
    pub fn new(ty: &InstrType, values: Vec<u32>, raw: Vec<String>) -> Instr {
        let values = values
            .iter()
            .enumerate()
            .map(|(i, &v)| match ty.operands.get(i) {
                Some(op) => v & field_mask(op.bits),
                None => v,
            })
            .collect();
        Instr {
            id: ty.id,
            values,
            raw,
        }
    }

    pub fn value(&self, idx: usize) -> Result<u32, AsmError> {
        self.values.get(idx).copied().ok_or(AsmError::OperandArity {
            expected: idx + 1,
            found: self.values.len(),
        })
    }

    pub fn raw_operand(&self, idx: usize) -> Result<&str, AsmError> {
        self.raw
            .get(idx)
            .map(String::as_str)
            .ok_or(AsmError::OperandArity {
                expected: idx + 1,
                found: self.raw.len(),
            })
    }
}

/// Catalogue of instruction and macro types. Built once at startup and
/// read-only afterwards.
pub struct Registry {
    instructions: HashMap<OpcodeId, InstrType>,
    opcode_names: HashMap<&'static str, OpcodeId>,
    macros: HashMap<MacroId, MacroType>,
    macro_names: HashMap<&'static str, MacroId>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry {
            instructions: HashMap::new(),
            opcode_names: HashMap::new(),
            macros: HashMap::new(),
            macro_names: HashMap::new(),
        }
    }

    pub fn register_instruction(
        &mut self,
        opcode: &'static str,
        id: OpcodeId,
        layout: &[(OperandKind, u32)],
    ) -> Result<(), AsmError> {
        let total: u32 = 6 + layout.iter().map(|&(_, bits)| bits).sum::<u32>();
        if total > 32 {
            return Err(AsmError::BitOverflow {
                opcode: opcode.to_string(),
                total,
            });
        }
        let operands = layout
            .iter()
            .map(|&(kind, bits)| Operand { kind, bits })
            .collect();
        self.opcode_names.insert(opcode, id);
        self.instructions.insert(id, InstrType { opcode, id, operands });
        Ok(())
    }

    pub fn register_macro(
        &mut self,
        opcode: &'static str,
        id: MacroId,
        base: OpcodeId,
        expand: MacroExpander,
    ) {
        self.macro_names.insert(opcode, id);
        self.macros.insert(
            id,
            MacroType {
                opcode,
                id,
                base,
                expand,
            },
        );
    }

    pub fn instruction(&self, id: OpcodeId) -> Option<&InstrType> {
        self.instructions.get(&id)
    }

    pub fn instruction_by_name(&self, opcode: &str) -> Option<&InstrType> {
        self.opcode_names.get(opcode).and_then(|id| self.instructions.get(id))
    }

    pub fn macro_def(&self, id: MacroId) -> Option<&MacroType> {
        self.macros.get(&id)
    }

    pub fn macro_by_name(&self, opcode: &str) -> Option<&MacroType> {
        self.macro_names.get(opcode).and_then(|id| self.macros.get(id))
    }

    /// The canonical SPARK catalogue.
    pub fn spark() -> Result<Registry, AsmError> {
        use OperandKind::{Immediate as IMM, Register as REG};

        let mut r = Registry::new();

        r.register_instruction("liw", OpcodeId::Liw, &[(REG, 5), (IMM, 16), (IMM, 1)])?;
        r.register_instruction("addi", OpcodeId::Addi, &[(REG, 5), (REG, 5), (IMM, 16)])?;
        r.register_instruction("add", OpcodeId::Add, &[(REG, 5), (REG, 5), (REG, 5)])?;
        r.register_instruction("mov", OpcodeId::Mov, &[(REG, 5), (REG, 5)])?;
        r.register_instruction("cmpr", OpcodeId::Cmpr, &[(REG, 5), (REG, 5)])?;
        r.register_instruction("cmpi", OpcodeId::Cmpi, &[(REG, 5), (IMM, 16)])?;
        r.register_instruction("jmpcr", OpcodeId::Jmpcr, &[(REG, 5), (IMM, 16)])?;
        r.register_instruction("jmp", OpcodeId::Jmp, &[(REG, 5)])?;

        r.register_macro("inc", MacroId::Inc, OpcodeId::Addi, expand_inc);
        r.register_macro("liwl", MacroId::Liwl, OpcodeId::Liw, expand_liwl);
        r.register_macro("liwh", MacroId::Liwh, OpcodeId::Liw, expand_liwh);
        r.register_macro("jmpeq", MacroId::Jmpeq, OpcodeId::Jmpcr, expand_jmpeq);
        r.register_macro("jmpl", MacroId::Jmpl, OpcodeId::Jmpcr, expand_jmpl);
        r.register_macro("jmpleq", MacroId::Jmpleq, OpcodeId::Jmpcr, expand_jmpleq);
        r.register_macro("jmpg", MacroId::Jmpg, OpcodeId::Jmpcr, expand_jmpg);
        r.register_macro("jmpgeq", MacroId::Jmpgeq, OpcodeId::Jmpcr, expand_jmpgeq);
        r.register_macro("labreg", MacroId::Labreg, OpcodeId::Addi, expand_labreg);
        r.register_macro("labjmp", MacroId::Labjmp, OpcodeId::Addi, expand_labjmp);
        r.register_macro("ret", MacroId::Ret, OpcodeId::Jmp, expand_ret);

        Ok(r)
    }
}

fn expand_inc(_ctx: &AsmContext, cur: &Instr) -> Result<Vec<u32>, AsmError> {
    let reg = cur.value(0)?;
    Ok(vec![reg, reg, 1])
}

fn expand_liwl(_ctx: &AsmContext, cur: &Instr) -> Result<Vec<u32>, AsmError> {
    Ok(vec![cur.value(0)?, cur.value(1)?, 0])
}

fn expand_liwh(_ctx: &AsmContext, cur: &Instr) -> Result<Vec<u32>, AsmError> {
    Ok(vec![cur.value(0)?, cur.value(1)?, 1])
}

fn expand_jmpeq(_ctx: &AsmContext, cur: &Instr) -> Result<Vec<u32>, AsmError> {
    Ok(vec![cur.value(0)?, Cond::Equal as u32])
}

fn expand_jmpl(_ctx: &AsmContext, cur: &Instr) -> Result<Vec<u32>, AsmError> {
    Ok(vec![cur.value(0)?, Cond::Less as u32])
}

fn expand_jmpleq(_ctx: &AsmContext, cur: &Instr) -> Result<Vec<u32>, AsmError> {
    Ok(vec![cur.value(0)?, Cond::LessOrEqual as u32])
}

fn expand_jmpg(_ctx: &AsmContext, cur: &Instr) -> Result<Vec<u32>, AsmError> {
    Ok(vec![cur.value(0)?, Cond::Greater as u32])
}

fn expand_jmpgeq(_ctx: &AsmContext, cur: &Instr) -> Result<Vec<u32>, AsmError> {
    Ok(vec![cur.value(0)?, Cond::GreaterOrEqual as u32])
}

// Label offset relative to the word being assembled: the label records the
// byte offset of the executable line after it, the current line sits at
// (cpu_line - 1) * 4.
fn label_displacement(ctx: &AsmContext, name: &str) -> Result<u32, AsmError> {
    let label = ctx.find_label(name)?;
    let here = ctx.cpu_line().wrapping_sub(1).wrapping_mul(4);
    Ok(label.offset.wrapping_sub(here))
}

fn expand_labreg(ctx: &AsmContext, cur: &Instr) -> Result<Vec<u32>, AsmError> {
    let disp = label_displacement(ctx, cur.raw_operand(1)?)?;
    Ok(vec![cur.value(0)?, Reg::Pc.index(), disp])
}

fn expand_labjmp(ctx: &AsmContext, cur: &Instr) -> Result<Vec<u32>, AsmError> {
    let disp = label_displacement(ctx, cur.raw_operand(0)?)?;
    Ok(vec![Reg::Jr.index(), Reg::Pc.index(), disp])
}

fn expand_ret(_ctx: &AsmContext, _cur: &Instr) -> Result<Vec<u32>, AsmError> {
    Ok(vec![Reg::RetAddr.index()])
}
