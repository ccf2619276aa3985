use crate::error::AsmError;

pub const SP: u8 = 62;
pub const LR: u8 = 63;
pub const ZERO: u8 = 0;

const REG_NAMES: [&str; 64] = [
    "$zero", "$r1", "$r2", "$r3", "$r4", "$r5", "$r6", "$r7",
    "$r8", "$r9", "$r10", "$r11", "$r12", "$r13", "$r14", "$r15",
    "$r16", "$r17", "$r18", "$r19", "$r20", "$r21", "$r22", "$r23",
    "$r24", "$r25", "$r26", "$r27", "$r28", "$r29", "$r30", "$r31",
    "$r32", "$r33", "$r34", "$r35", "$r36", "$r37", "$r38", "$r39",
    "$r40", "$r41", "$r42", "$r43", "$r44", "$r45", "$r46", "$r47",
    "$r48", "$r49", "$r50", "$r51", "$r52", "$r53", "$r54", "$r55",
    "$r56", "$r57", "$r58", "$r59", "$r60", "$r61", "$sp", "$lr",
];

/// Canonical spelling of register `r` (low six bits).
pub fn reg_name(r: u8) -> &'static str {
    REG_NAMES[(r & 0x3f) as usize]
}

/// Parse a register operand at the start of `s`.
///
/// Accepts `$lr`, `$sp`, `$zero`, and `$r0`..`$r61`. Returns the register index and the
/// number of bytes consumed; text after the register is left for the caller.
pub fn parse_register(s: &str) -> Result<(u8, usize), AsmError> {
    let Some(rest) = s.strip_prefix('$') else {
        return Err(illegal(s));
    };
    if rest.starts_with("lr") {
        return Ok((LR, 3));
    }
    if rest.starts_with("sp") {
        return Ok((SP, 3));
    }
    if rest.starts_with("zero") {
        return Ok((ZERO, 5));
    }
    let Some(digits) = rest.strip_prefix('r') else {
        return Err(illegal(s));
    };
    let b = digits.as_bytes();
    let hi = b.first().filter(|c| c.is_ascii_digit()).map(|c| c - b'0');
    let lo = b.get(1).filter(|c| c.is_ascii_digit()).map(|c| c - b'0');
    match (hi, lo) {
        (Some(hi), Some(lo)) => {
            let r = hi * 10 + lo;
            if hi <= 6 && r <= 61 { Ok((r, 4)) } else { Err(illegal(s)) }
        }
        (Some(hi), None) => Ok((hi, 3)),
        _ => Err(illegal(s)),
    }
}

fn illegal(s: &str) -> AsmError {
    let end = s.find(|c: char| c.is_whitespace() || c == ',').unwrap_or(s.len());
    AsmError::IllegalRegisterNumber(s[..end].to_string())
}
