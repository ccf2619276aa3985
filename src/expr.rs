//! Operand expressions: integer constants and symbols joined by `+` and `-`.
//!
//! The result of a parse is either a constant or `symbol + addend` with a single
//! unresolved symbol, which is what a relocation can express.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AsmError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    pub symbol: Option<String>,
    pub addend: i64,
}

impl Expr {
    pub fn constant(v: i64) -> Self {
        Self { symbol: None, addend: v }
    }

    pub fn as_constant(&self) -> Option<i64> {
        match self.symbol {
            None => Some(self.addend),
            Some(_) => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.symbol, self.addend) {
            (None, v) => write!(f, "{v}"),
            (Some(s), 0) => write!(f, "{s}"),
            (Some(s), v) if v < 0 => write!(f, "{s}{v}"),
            (Some(s), v) => write!(f, "{s}+{v}"),
        }
    }
}

/// Values for symbols known at assembly time.
pub trait SymbolLookup {
    fn value(&self, name: &str) -> Option<i64>;
}

/// Nothing resolves; every symbol becomes a relocation.
pub struct NoSymbols;

impl SymbolLookup for NoSymbols {
    fn value(&self, _name: &str) -> Option<i64> {
        None
    }
}

impl SymbolLookup for HashMap<String, i64> {
    fn value(&self, name: &str) -> Option<i64> {
        self.get(name).copied()
    }
}

fn is_symbol_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'.'
}

fn is_symbol_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'.' | b'$')
}

/// Parse an expression at the start of `s` (leading whitespace allowed).
///
/// Returns the expression and the number of bytes consumed. Parsing stops at the first
/// character that cannot continue the expression, so `8($sp)` consumes only `8`.
pub fn parse_expr(s: &str, symbols: &dyn SymbolLookup) -> Result<(Expr, usize), AsmError> {
    let b = s.as_bytes();
    let bad = || AsmError::BadExpression(s.trim().to_string());
    let skip_ws = |mut i: usize| {
        while i < b.len() && b[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    };

    let mut expr = Expr::constant(0);
    let mut i = skip_ws(0);
    let mut negate = match b.get(i) {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };
    loop {
        i = skip_ws(i);
        let start = i;
        let c = *b.get(i).ok_or_else(bad)?;
        let value = if c.is_ascii_digit() {
            while i < b.len() && b[i].is_ascii_alphanumeric() {
                i += 1;
            }
            parse_number(&s[start..i]).ok_or_else(bad)?
        } else if is_symbol_start(c) {
            while i < b.len() && is_symbol_char(b[i]) {
                i += 1;
            }
            let name = &s[start..i];
            match symbols.value(name) {
                Some(v) => v,
                None if negate || expr.symbol.is_some() => return Err(bad()),
                None => {
                    expr.symbol = Some(name.to_string());
                    0
                }
            }
        } else {
            return Err(bad());
        };
        expr.addend = if negate { expr.addend.wrapping_sub(value) } else { expr.addend.wrapping_add(value) };

        let end = i;
        i = skip_ws(i);
        negate = match b.get(i) {
            Some(b'+') => false,
            Some(b'-') => true,
            _ => return Ok((expr, end)),
        };
        i += 1;
    }
}

fn parse_number(tok: &str) -> Option<i64> {
    let v = if let Some(hex) = tok.strip_prefix("0x").or_else(|| tok.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else if let Some(bin) = tok.strip_prefix("0b").or_else(|| tok.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2)
    } else {
        tok.parse::<u64>()
    };
    v.ok().map(|v| v as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(s: &str) -> Result<(Expr, usize), AsmError> {
        parse_expr(s, &NoSymbols)
    }

    #[test]
    fn numbers() {
        assert_eq!(parse("42").unwrap(), (Expr::constant(42), 2));
        assert_eq!(parse(" 0x10").unwrap(), (Expr::constant(16), 5));
        assert_eq!(parse("0b101").unwrap().0, Expr::constant(5));
        assert_eq!(parse("-8").unwrap().0, Expr::constant(-8));
        assert_eq!(parse("1 + 2 - 4").unwrap(), (Expr::constant(-1), 9));
    }

    #[test]
    fn symbol_with_addend() {
        let (e, n) = parse("target+4, rest").unwrap();
        assert_eq!(e, Expr { symbol: Some("target".into()), addend: 4 });
        assert_eq!(n, 8);
        assert_eq!(e.to_string(), "target+4");
        assert_eq!(parse("4 + .L1 - 6").unwrap().0.to_string(), ".L1-2");
    }

    #[test]
    fn known_symbols_fold() {
        let mut syms = HashMap::new();
        syms.insert("size".to_string(), 0x20i64);
        let (e, _) = parse_expr("size - 4", &syms).unwrap();
        assert_eq!(e.as_constant(), Some(0x1c));
        let (e, _) = parse_expr("-size", &syms).unwrap();
        assert_eq!(e.as_constant(), Some(-0x20));
    }

    #[test]
    fn stops_before_memory_base() {
        assert_eq!(parse("-16($sp)").unwrap(), (Expr::constant(-16), 3));
    }

    #[test]
    fn rejects_unrepresentable() {
        assert!(matches!(parse("a + b"), Err(AsmError::BadExpression(_))));
        assert!(matches!(parse("-a"), Err(AsmError::BadExpression(_))));
        assert!(matches!(parse("4 +"), Err(AsmError::BadExpression(_))));
        assert!(matches!(parse(""), Err(AsmError::BadExpression(_))));
        assert!(matches!(parse("0xzz"), Err(AsmError::BadExpression(_))));
        assert!(matches!(parse("$r1"), Err(AsmError::BadExpression(_))));
    }
}
