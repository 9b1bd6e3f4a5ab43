use std::fmt::Write as _;
use std::path::Path;

use crate::classify::{classify_line, LineKind};
use crate::cleanup::clean_line;
use crate::context::{AsmContext, Label, SourceLine};
use crate::decode::decode_word;
use crate::encode::encode_line;
use crate::include::expand_input;
use crate::registers::Reg;
use crate::registry::Registry;
use crate::AsmError;

#[derive(Debug)]
pub struct AssembleOutput {
    /// Host-order instruction words, one per executable line.
    pub words: Vec<u32>,
    pub labels: Vec<Label>,
}

/// Translates one source file: expansion pass, then classify/encode in
/// strict line order. Labels are discovered inline, so macros referencing a
/// label can only look backwards.
pub fn assemble_file(registry: &Registry, input: &Path) -> Result<AssembleOutput, AsmError> {
    let mut ctx = AsmContext::new(input);
    let lines = expand_input(&mut ctx, input)?;

    let mut words = Vec::new();
    for line in &lines {
        ctx.set_current_file(&line.file);
        let clean = clean_line(&line.raw);

        match classify_line(&clean) {
            LineKind::Empty => {}
            LineKind::Label => {
                // the classifier guarantees the colon
                if let Some(i) = clean.find(':') {
                    ctx.add_label_here(&clean[..i]);
                }
            }
            LineKind::RegisterMacro => {
                bind_register_macro(&mut ctx, &clean).map_err(|e| at_line(line, e))?;
            }
            LineKind::Executable => {
                ctx.bump_cpu_line();
                match encode_line(&ctx, registry, &clean) {
                    Ok(word) => words.push(word),
                    Err(AsmError::IgnoreLine { reason }) => {
                        tracing::debug!(
                            "ignoring {}:{}: `{}` - {reason}",
                            line.file.display(),
                            line.asm_line,
                            line.raw
                        );
                    }
                    Err(e) => return Err(at_line(line, e)),
                }
            }
        }
    }

    Ok(AssembleOutput {
        words,
        labels: ctx.into_labels(),
    })
}

fn bind_register_macro(ctx: &mut AsmContext, clean: &str) -> Result<(), AsmError> {
    let Some(i) = clean.find('=') else {
        return Ok(());
    };
    let repr = &clean[..i];
    let reg = Reg::from_name(&clean[i + 1..]);
    ctx.set_register_macro(repr, reg)
}

fn at_line(line: &SourceLine, source: AsmError) -> AsmError {
    match source {
        e @ AsmError::AtLine { .. } => e,
        e => AsmError::AtLine {
            file: line.file.clone(),
            line: line.asm_line,
            raw: line.raw.clone(),
            source: Box::new(e),
        },
    }
}

/// Serializes assembled words in on-disk order: big-endian, back to back.
pub fn to_be_bytes(words: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(words.len() * 4);
    for word in words {
        out.extend_from_slice(&word.to_be_bytes());
    }
    out
}

/// Renders a flat big-endian word stream as text, one instruction per line.
/// With `hexdump` every line is right-padded to the longest and annotated
/// with `; <word> <byte offset>`. A trailing partial word is ignored.
pub fn disassemble(registry: &Registry, bytes: &[u8], hexdump: bool) -> Result<String, AsmError> {
    let count = bytes.len() / 4;
    let mut lines = Vec::with_capacity(count);
    let mut max_len = 0;

    for i in 0..count {
        let off = i * 4;
        let word = u32::from_be_bytes([
            bytes[off],
            bytes[off + 1],
            bytes[off + 2],
            bytes[off + 3],
        ]);
        let line = decode_word(registry, word).map_err(|e| AsmError::AtOffset {
            offset: off as u32,
            source: Box::new(e),
        })?;
        max_len = max_len.max(line.len());
        lines.push((line, word));
    }

    let mut out = String::new();
    for (i, (line, word)) in lines.iter().enumerate() {
        out.push_str(line);
        if hexdump {
            for _ in line.len()..max_len {
                out.push(' ');
            }
            let _ = write!(out, " ; {word:08X}\t{:08X}", i * 4);
        }
        out.push('\n');
    }
    Ok(out)
}
