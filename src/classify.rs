use crate::registers::Reg;

/// What a cleaned line contributes to the translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Empty,
    Label,
    RegisterMacro,
    Executable,
}

/// Classifies a cleaned line. Label wins over register macro when both
/// patterns match.
pub fn classify_line(clean: &str) -> LineKind {
    if clean.is_empty() {
        return LineKind::Empty;
    }
    if clean.find(':').is_some_and(|i| i > 0) {
        return LineKind::Label;
    }
    if is_register_macro(clean) {
        return LineKind::RegisterMacro;
    }
    LineKind::Executable
}

fn is_register_macro(clean: &str) -> bool {
    let Some(i) = clean.find('=') else {
        return false;
    };
    if i == 0 || clean.matches('=').count() != 1 {
        return false;
    }
    Reg::from_name(&clean[i + 1..]).is_some()
}
