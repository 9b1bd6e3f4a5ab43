use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::registers::Reg;
use crate::AsmError;

/// A named byte offset into the emitted instruction stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub offset: u32,
    pub name: String,
}

/// One buffered source line after include expansion, carrying its
/// diagnostics coordinates.
#[derive(Debug, Clone)]
pub struct SourceLine {
    pub file: PathBuf,
    pub asm_line: u32,
    pub raw: String,
}

/// Per-run assembler state: labels, include search paths, register-macro
/// aliases and the two line counters.
pub struct AsmContext {
    labels: Vec<Label>,
    include_paths: Vec<PathBuf>,
    register_macros: HashMap<String, Reg>,
    current_file: PathBuf,
    // counts executable lines only, 1-based once the first word is emitted
    cpu_line: u32,
    // counts every physical source line
    asm_line: u32,
}

impl AsmContext {
    pub fn new(input: &Path) -> AsmContext {
        AsmContext {
            labels: Vec::new(),
            include_paths: Vec::new(),
            register_macros: HashMap::new(),
            current_file: input.to_path_buf(),
            cpu_line: 0,
            asm_line: 0,
        }
    }

    pub fn cpu_line(&self) -> u32 {
        self.cpu_line
    }

    pub fn asm_line(&self) -> u32 {
        self.asm_line
    }

    /// Bumped for every executable line, before it is encoded.
    pub fn bump_cpu_line(&mut self) {
        self.cpu_line += 1;
    }

    /// Bumped for every physical line read during expansion.
    pub fn bump_asm_line(&mut self) {
        self.asm_line += 1;
    }

    pub fn current_file(&self) -> &Path {
        &self.current_file
    }

    pub fn set_current_file(&mut self, path: &Path) {
        self.current_file = path.to_path_buf();
    }

    /// Records a label for the next executable line: its cpu line number is
    /// one past the count emitted so far, and offsets are in bytes.
    pub fn add_label_here(&mut self, name: &str) {
        self.labels.push(Label {
            offset: (self.cpu_line + 1) * 4,
            name: name.to_string(),
        });
    }

    pub fn find_label(&self, name: &str) -> Result<&Label, AsmError> {
        self.labels
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| AsmError::UnknownLabel {
                name: name.to_string(),
            })
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn into_labels(self) -> Vec<Label> {
        self.labels
    }

    pub fn set_register_macro(&mut self, repr: &str, reg: Option<Reg>) -> Result<(), AsmError> {
        let Some(reg) = reg else {
            return Err(AsmError::InvalidRegisterMacro {
                repr: repr.to_string(),
            });
        };
        if let Some(old) = self.register_macros.insert(repr.to_string(), reg) {
            tracing::debug!("register macro `{repr}` rebound from {old:?} to {reg:?}");
        }
        Ok(())
    }

    pub fn register_macro(&self, repr: &str) -> Option<Reg> {
        self.register_macros.get(repr).copied()
    }

    /// Canonicalizes and records an include search path.
    pub fn add_include_path(&mut self, path: &str) -> Result<(), AsmError> {
        let absolute = std::fs::canonicalize(path).map_err(|source| AsmError::PathError {
            path: PathBuf::from(path),
            source,
        })?;
        self.include_paths.push(absolute);
        Ok(())
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }
}
