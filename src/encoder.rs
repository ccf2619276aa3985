use tracing::debug;

use crate::decoder::{Decoded, Width};
use crate::error::{AsmError, AsmWarning};
use crate::expr::{parse_expr, Expr, NoSymbols, SymbolLookup};
use crate::isa::r64;
use crate::opcodes::{OpcodeTable, Shape};
use crate::regs::parse_register;
use crate::reloc::Fixup;

/// One encoded instruction. Always the 64-bit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    pub word: u64,
    pub fixups: Vec<Fixup>,
    pub warnings: Vec<AsmWarning>,
}

impl Assembled {
    pub fn bytes(&self) -> [u8; 8] {
        self.word.to_be_bytes()
    }
}

pub struct Encoder<'t> {
    table: &'t OpcodeTable,
}

impl<'t> Encoder<'t> {
    pub fn new(table: &'t OpcodeTable) -> Self {
        Self { table }
    }

    pub fn assemble_line(&self, text: &str) -> Result<Assembled, AsmError> {
        self.assemble_line_with(text, &NoSymbols)
    }

    /// Encode one instruction. Symbols `symbols` knows are folded into constants; any
    /// other symbol reference becomes a fixup.
    pub fn assemble_line_with(
        &self,
        text: &str,
        symbols: &dyn SymbolLookup,
    ) -> Result<Assembled, AsmError> {
        let text = text.trim_start();
        let end = text.find(char::is_whitespace).unwrap_or(text.len());
        let (mnemonic, rest) = text.split_at(end);
        let entry = self
            .table
            .lookup(mnemonic)
            .filter(|e| !e.is_bad())
            .ok_or_else(|| AsmError::UnknownOpcode(mnemonic.to_string()))?;

        let mut ops = Operands { rest, symbols };
        let mut d = Decoded::new(entry, Width::W64);
        let mut fixups = Vec::new();
        let mut warnings = Vec::new();

        match entry.shape {
            Shape::None => {}
            Shape::Ds1s2 => {
                d.rd = ops.register()?;
                ops.comma()?;
                d.rs1 = ops.register()?;
                ops.comma()?;
                d.rs2 = ops.register()?;
            }
            Shape::S1 => d.rs1 = ops.register()?,
            Shape::Dd2s1s2 => {
                d.rd = ops.register()?;
                ops.comma()?;
                d.rd2 = ops.register()?;
                ops.comma()?;
                d.rs1 = ops.register()?;
                ops.comma()?;
                d.rs2 = ops.register()?;
            }
            Shape::Ds1i | Shape::Bds1i => {
                d.rd = ops.register()?;
                ops.comma()?;
                d.rs1 = ops.register()?;
                ops.comma()?;
                let e = ops.expr()?;
                match e.as_constant() {
                    // branch offsets count 2-byte units
                    Some(v) if entry.shape == Shape::Bds1i && v & 1 != 0 => {
                        return Err(AsmError::MisalignedBranch(v));
                    }
                    Some(v) if entry.shape == Shape::Bds1i => d.imm = imm32(v >> 1, &mut warnings),
                    Some(v) => d.imm = imm32(v, &mut warnings),
                    None => fixups.push(Fixup::pcrel32(e)),
                }
            }
            Shape::Di => {
                d.rd = ops.register()?;
                ops.comma()?;
                d.imm = imm32(ops.constant()?, &mut warnings);
            }
            Shape::Mds1i => {
                d.rd = ops.register()?;
                ops.comma()?;
                let (off, base) = ops.memory()?;
                d.rs1 = base;
                d.imm = imm32(off, &mut warnings);
            }
            Shape::Ji => fixups.push(Fixup::abs56(ops.expr()?)),
            Shape::Ds1s2i => {
                d.rd = ops.register()?;
                ops.comma()?;
                d.rs1 = ops.register()?;
                ops.comma()?;
                d.rs2 = ops.register()?;
                ops.comma()?;
                d.imm = imm32(ops.constant()?, &mut warnings);
            }
            Shape::Bad => return Err(AsmError::UnknownOpcode(mnemonic.to_string())),
        }
        if let Some(w) = ops.trailing() {
            warnings.push(w);
        }

        let word = r64::pack(&d);
        debug!("{mnemonic}: {word:#018x} ({} fixups)", fixups.len());
        Ok(Assembled { word, fixups, warnings })
    }
}

fn imm32(v: i64, warnings: &mut Vec<AsmWarning>) -> u64 {
    if !(-(1i64 << 31)..1i64 << 32).contains(&v) {
        warnings.push(AsmWarning::ImmediateTruncated { value: v });
    }
    v as u64 & 0xffff_ffff
}

fn malformed(s: &str) -> AsmError {
    AsmError::MalformedOperand(s.trim().to_string())
}

/// Cursor over the operand text of one line.
struct Operands<'a> {
    rest: &'a str,
    symbols: &'a dyn SymbolLookup,
}

impl Operands<'_> {
    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn register(&mut self) -> Result<u8, AsmError> {
        self.skip_ws();
        let (r, n) = parse_register(self.rest)?;
        self.rest = &self.rest[n..];
        Ok(r)
    }

    fn comma(&mut self) -> Result<(), AsmError> {
        self.skip_ws();
        self.rest = self.rest.strip_prefix(',').ok_or(AsmError::ExpectingComma)?;
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr, AsmError> {
        let (e, n) = parse_expr(self.rest, self.symbols)?;
        self.rest = &self.rest[n..];
        Ok(e)
    }

    fn constant(&mut self) -> Result<i64, AsmError> {
        let e = self.expr()?;
        e.as_constant().ok_or_else(|| AsmError::ExpressionNotConstant(e.to_string()))
    }

    /// `[offset](base)`; a missing offset is zero.
    fn memory(&mut self) -> Result<(i64, u8), AsmError> {
        self.skip_ws();
        let off = if self.rest.starts_with('(') { 0 } else { self.constant()? };
        self.skip_ws();
        let rest = self.rest;
        self.rest = rest.strip_prefix('(').ok_or_else(|| malformed(rest))?;
        let base = self.register()?;
        self.skip_ws();
        let rest = self.rest;
        self.rest = rest.strip_prefix(')').ok_or_else(|| malformed(rest))?;
        Ok((off, base))
    }

    fn trailing(&self) -> Option<AsmWarning> {
        let t = self.rest.trim();
        t.chars()
            .any(|c| !c.is_whitespace() && !c.is_control())
            .then(|| AsmWarning::ExtraStuffIgnored(t.to_string()))
    }
}
