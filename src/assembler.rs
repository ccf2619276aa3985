//! Whole-source assembly: labels, constants, per-line diagnostics and fixup resolution.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::encoder::Encoder;
use crate::error::{AsmError, RelocError};
use crate::expr::parse_expr;
use crate::opcodes::OpcodeTable;
use crate::reloc::{apply_fixup, Fixup, RelocKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    pub base: u64,         // address of the first instruction
    pub fatal_warnings: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self { base: 0, fatal_warnings: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub line: usize,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.line, self.severity, self.message)
    }
}

/// A fixup left for the linker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    /// Address of the patched field, not of the instruction.
    pub address: u64,
    pub kind: RelocKind,
    pub symbol: String,
    pub addend: i64,
    pub pcrel: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineEntry {
    pub address: u64,
    pub line: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Assembly {
    pub base: u64,
    pub bytes: Vec<u8>,
    pub relocations: Vec<Relocation>,
    pub lines: Vec<LineEntry>,
    pub labels: BTreeMap<String, u64>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Assembly {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn word_at(&self, addr: u64) -> Option<u64> {
        let off = usize::try_from(addr.checked_sub(self.base)?).ok()?;
        let b: [u8; 8] = self.bytes.get(off..off.checked_add(8)?)?.try_into().ok()?;
        Some(u64::from_be_bytes(b))
    }

    fn report(&mut self, line: usize, severity: Severity, message: String) {
        warn!("line {line}: {severity}: {message}");
        self.diagnostics.push(Diagnostic { line, severity, message });
    }
}

struct Pending {
    address: u64,
    line: usize,
    fixup: Fixup,
}

pub struct Assembler<'t> {
    encoder: Encoder<'t>,
    config: AssemblerConfig,
}

impl<'t> Assembler<'t> {
    pub fn new(table: &'t OpcodeTable, config: AssemblerConfig) -> Self {
        Self { encoder: Encoder::new(table), config }
    }

    /// Assemble a complete source text.
    ///
    /// Line-level problems are collected in `Assembly::diagnostics` and assembly carries
    /// on with the next statement. Only an internal relocation failure is returned as an
    /// error.
    pub fn assemble(&self, src: &str) -> Result<Assembly, RelocError> {
        let mut out = Assembly { base: self.config.base, ..Default::default() };
        let mut constants: HashMap<String, i64> = HashMap::new();
        let mut pending = Vec::new();
        // next free address; None once the top of the address space is reached
        let mut addr = Some(self.config.base);
        let warn_sev = if self.config.fatal_warnings { Severity::Error } else { Severity::Warning };

        'lines: for (idx, raw) in src.lines().enumerate() {
            let line = idx + 1;
            let code = raw.split('#').next().unwrap_or("");
            for stmt in code.split(';') {
                let mut stmt = stmt.trim();
                while let Some((label, rest)) = split_label(stmt) {
                    let Some(at) = addr else {
                        out.report(line, Severity::Error, AsmError::AddressSpaceExhausted.to_string());
                        break 'lines;
                    };
                    if out.labels.contains_key(label) || constants.contains_key(label) {
                        out.report(line, Severity::Error, AsmError::DuplicateSymbol(label.into()).to_string());
                    } else {
                        out.labels.insert(label.to_string(), at);
                    }
                    stmt = rest.trim_start();
                }
                if stmt.is_empty() {
                    continue;
                }

                if let Some((name, rhs)) = split_assignment(stmt) {
                    match define_constant(name, rhs, &constants, &out.labels) {
                        Ok(v) => {
                            constants.insert(name.to_string(), v);
                        }
                        Err(e) => out.report(line, Severity::Error, e.to_string()),
                    }
                    continue;
                }

                // all eight bytes of the word must be addressable
                let Some(at) = addr.filter(|a| a.checked_add(7).is_some()) else {
                    out.report(line, Severity::Error, AsmError::AddressSpaceExhausted.to_string());
                    break 'lines;
                };
                match self.encoder.assemble_line_with(stmt, &constants) {
                    Ok(a) => {
                        for w in a.warnings {
                            out.report(line, warn_sev, w.to_string());
                        }
                        pending.extend(a.fixups.into_iter().map(|fixup| Pending { address: at, line, fixup }));
                        out.lines.push(LineEntry { address: at, line });
                        out.bytes.extend_from_slice(&a.word.to_be_bytes());
                        addr = at.checked_add(8);
                    }
                    Err(e) => out.report(line, Severity::Error, e.to_string()),
                }
            }
        }

        for p in pending {
            self.resolve(&mut out, &constants, p)?;
        }
        Ok(out)
    }

    fn resolve(
        &self,
        out: &mut Assembly,
        constants: &HashMap<String, i64>,
        p: Pending,
    ) -> Result<(), RelocError> {
        let expr = &p.fixup.expr;
        let target = match &expr.symbol {
            None => Some(0),
            Some(s) => out.labels.get(s).map(|&a| a as i64).or_else(|| constants.get(s).copied()),
        };
        let Some(target) = target else {
            // the word at p.address lies wholly inside the address space
            let address = p.address.saturating_add(p.fixup.offset as u64);
            debug!("{} at {address:#x} left for the linker: {expr}", p.fixup.kind);
            out.relocations.push(Relocation {
                address,
                kind: p.fixup.kind,
                symbol: expr.symbol.clone().unwrap_or_default(),
                addend: expr.addend,
                pcrel: p.fixup.pcrel,
            });
            return Ok(());
        };

        let mut value = target.wrapping_add(expr.addend);
        if p.fixup.pcrel {
            value = value.wrapping_sub(p.address as i64);
        }
        debug!("{} at {:#x}: {expr} = {value}", p.fixup.kind, p.address);
        let off = (p.address - self.config.base) as usize;
        match apply_fixup(&mut out.bytes[off..off + 8], &p.fixup, value) {
            Ok(()) => Ok(()),
            Err(e @ (RelocError::Range { .. } | RelocError::Misaligned { .. })) => {
                out.report(p.line, Severity::Error, e.to_string());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

fn symbol_len(s: &str) -> usize {
    let b = s.as_bytes();
    match b.first() {
        Some(c) if c.is_ascii_alphabetic() || matches!(c, b'_' | b'.') => b
            .iter()
            .position(|c| !(c.is_ascii_alphanumeric() || matches!(c, b'_' | b'.' | b'$')))
            .unwrap_or(b.len()),
        _ => 0,
    }
}

/// `name: rest`
fn split_label(stmt: &str) -> Option<(&str, &str)> {
    let n = symbol_len(stmt);
    let rest = stmt[n..].strip_prefix(':')?;
    (n > 0).then(|| (&stmt[..n], rest))
}

/// `name = expr`
fn split_assignment(stmt: &str) -> Option<(&str, &str)> {
    let n = symbol_len(stmt);
    let rest = stmt[n..].trim_start().strip_prefix('=')?;
    (n > 0).then(|| (&stmt[..n], rest))
}

fn define_constant(
    name: &str,
    rhs: &str,
    constants: &HashMap<String, i64>,
    labels: &BTreeMap<String, u64>,
) -> Result<i64, AsmError> {
    if constants.contains_key(name) || labels.contains_key(name) {
        return Err(AsmError::DuplicateSymbol(name.to_string()));
    }
    let (e, n) = parse_expr(rhs, constants)?;
    if !rhs[n..].trim().is_empty() {
        return Err(AsmError::BadExpression(rhs.trim().to_string()));
    }
    e.as_constant().ok_or_else(|| AsmError::ExpressionNotConstant(e.to_string()))
}
