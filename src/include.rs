use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::cleanup::clean_line;
use crate::context::{AsmContext, SourceLine};
use crate::AsmError;

/// Reads the input file and recursively expands `#include` /
/// `#includePath` directives into an ordered line buffer. Only the
/// assembler line counter advances here.
pub fn expand_input(ctx: &mut AsmContext, input: &Path) -> Result<Vec<SourceLine>, AsmError> {
    let mut lines = Vec::new();
    let mut in_flight = HashSet::new();
    expand_file(ctx, input, &mut in_flight, &mut lines)?;
    Ok(lines)
}

fn expand_file(
    ctx: &mut AsmContext,
    path: &Path,
    in_flight: &mut HashSet<PathBuf>,
    out: &mut Vec<SourceLine>,
) -> Result<(), AsmError> {
    let text = std::fs::read_to_string(path).map_err(|source| AsmError::InputRead {
        path: path.to_path_buf(),
        source,
    })?;
    // cycle detection is scoped to the active recursion; including the same
    // file twice on separate branches is allowed
    let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !in_flight.insert(key.clone()) {
        return Err(AsmError::IncludeCycle {
            path: path.to_path_buf(),
        });
    }

    ctx.set_current_file(path);
    for raw in text.lines() {
        ctx.bump_asm_line();
        let clean = clean_line(raw);

        if clean.starts_with("#includePath") {
            let dir = unquote(&clean).map_err(|e| at_directive(ctx, raw, e))?;
            ctx.add_include_path(&dir)
                .map_err(|e| at_directive(ctx, raw, e))?;
            continue;
        }
        if clean.starts_with("#include ") {
            let name = unquote(&clean).map_err(|e| at_directive(ctx, raw, e))?;
            let target =
                resolve_include(ctx, path, &name).map_err(|e| at_directive(ctx, raw, e))?;
            expand_file(ctx, &target, in_flight, out)?;
            ctx.set_current_file(path);
            continue;
        }

        out.push(SourceLine {
            file: path.to_path_buf(),
            asm_line: ctx.asm_line(),
            raw: raw.to_string(),
        });
    }

    in_flight.remove(&key);
    Ok(())
}

/// Resolves an include name: first relative to the including file, then
/// against the search paths. More than one search-path hit is a conflict.
fn resolve_include(
    ctx: &AsmContext,
    including_file: &Path,
    name: &str,
) -> Result<PathBuf, AsmError> {
    let local = including_file
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(name);
    if local.is_file() {
        return Ok(local);
    }

    let candidates: Vec<PathBuf> = ctx
        .include_paths()
        .iter()
        .map(|dir| dir.join(name))
        .filter(|p| p.is_file())
        .collect();

    match candidates.len() {
        0 => Err(AsmError::IncludeResolve {
            name: name.to_string(),
            file: ctx.current_file().to_path_buf(),
        }),
        1 => Ok(candidates.into_iter().next().unwrap_or(local)),
        _ => Err(AsmError::IncludeConflict {
            name: name.to_string(),
            candidates,
        }),
    }
}

// Directive arguments are single-quoted: `#include 'lib.s'`.
fn unquote(clean: &str) -> Result<String, AsmError> {
    let open = clean.find('\'');
    let close = clean.rfind('\'');
    match (open, close) {
        (Some(a), Some(b)) if b > a => Ok(clean[a + 1..b].to_string()),
        _ => Err(AsmError::DirectiveSyntax {
            line: clean.to_string(),
        }),
    }
}

fn at_directive(ctx: &AsmContext, raw: &str, source: AsmError) -> AsmError {
    match source {
        e @ AsmError::AtLine { .. } => e,
        e => AsmError::AtLine {
            file: ctx.current_file().to_path_buf(),
            line: ctx.asm_line(),
            raw: raw.to_string(),
            source: Box::new(e),
        },
    }
}
