use crate::context::AsmContext;
use crate::registers::Reg;
use crate::AsmError;

/// Splits a cleaned executable line into its opcode and the operand text.
pub fn split_opcode(clean: &str) -> (&str, Option<&str>) {
    match clean.find(' ') {
        Some(i) => (&clean[..i], Some(&clean[i + 1..])),
        None => (clean, None),
    }
}

/// Parses the comma-separated operand text into numeric values and raw
/// tokens. Quoted tokens are kept raw-only; they exist to feed macro
/// expanders and contribute no numeric value.
pub fn parse_operand_list(
    ctx: &AsmContext,
    operands: Option<&str>,
) -> Result<(Vec<u32>, Vec<String>), AsmError> {
    let Some(operands) = operands else {
        return Ok((Vec::new(), Vec::new()));
    };

    let mut values = Vec::new();
    let mut raw = Vec::new();
    for token in operands.split(',') {
        if token.contains('\'') {
            if token.len() < 2 {
                return Err(AsmError::OperandParse {
                    token: token.to_string(),
                });
            }
            raw.push(token[1..token.len() - 1].to_string());
            continue;
        }
        raw.push(token.to_string());
        values.push(parse_operand(ctx, token)?);
    }
    Ok((values, raw))
}

/// Resolves one textual operand: register-macro alias, then canonical
/// register name, then integer (`0x` hex, `0b` binary, decimal).
pub fn parse_operand(ctx: &AsmContext, token: &str) -> Result<u32, AsmError> {
    if let Some(reg) = ctx.register_macro(token) {
        return Ok(reg.index());
    }
    if let Some(reg) = Reg::from_name(token) {
        return Ok(reg.index());
    }

    let (digits, radix) = if let Some(rest) = token.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = token.strip_prefix("0b") {
        (rest, 2)
    } else {
        (token, 10)
    };
    i64::from_str_radix(digits, radix)
        .map(|v| v as u32)
        .map_err(|_| AsmError::OperandParse {
            token: token.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn ctx() -> AsmContext {
        AsmContext::new(Path::new("test.s"))
    }

    #[test]
    fn splits_opcode_and_operands() {
        assert_eq!(split_opcode("add r0,r1,r2"), ("add", Some("r0,r1,r2")));
        assert_eq!(split_opcode("ret"), ("ret", None));
    }

    #[test]
    fn parses_registers_and_numbers() {
        let ctx = ctx();
        assert_eq!(parse_operand(&ctx, "r0").unwrap(), 8);
        assert_eq!(parse_operand(&ctx, "sp").unwrap(), 28);
        assert_eq!(parse_operand(&ctx, "42").unwrap(), 42);
        assert_eq!(parse_operand(&ctx, "0x2A").unwrap(), 42);
        assert_eq!(parse_operand(&ctx, "0b101010").unwrap(), 42);
        assert_eq!(parse_operand(&ctx, "-4").unwrap(), 0xFFFF_FFFC);
    }

    #[test]
    fn alias_wins_over_literal_parse() {
        let mut ctx = ctx();
        ctx.set_register_macro("count", Some(crate::registers::Reg::R4))
            .unwrap();
        assert_eq!(parse_operand(&ctx, "count").unwrap(), 12);
    }

    #[test]
    fn rejects_garbage() {
        let ctx = ctx();
        assert!(matches!(
            parse_operand(&ctx, "banana"),
            Err(AsmError::OperandParse { .. })
        ));
        assert!(matches!(
            parse_operand(&ctx, "0x"),
            Err(AsmError::OperandParse { .. })
        ));
    }

    #[test]
    fn quoted_tokens_stay_raw() {
        let ctx = ctx();
        let (values, raw) = parse_operand_list(&ctx, Some("r5,'loop'")).unwrap();
        assert_eq!(values, vec![13]);
        assert_eq!(raw, vec!["r5".to_string(), "loop".to_string()]);
    }

    #[test]
    fn no_operand_text_means_empty_lists() {
        let ctx = ctx();
        let (values, raw) = parse_operand_list(&ctx, None).unwrap();
        assert!(values.is_empty());
        assert!(raw.is_empty());
    }
}
