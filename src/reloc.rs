use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RelocError;
use crate::expr::Expr;

/// ELF relocation types for raisin64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelocKind {
    None = 0,
    /// Absolute jump target in the low seven bytes of a 64-bit word.
    Abs56 = 1,
    Pcrel32 = 2,
    Pcrel12 = 3,
    Data32 = 4,
}

impl RelocKind {
    pub fn elf_type(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            RelocKind::None => "R_RAISIN64_NONE",
            RelocKind::Abs56 => "R_RAISIN64_56",
            RelocKind::Pcrel32 => "R_RAISIN64_PCREL32",
            RelocKind::Pcrel12 => "R_RAISIN64_PCREL12",
            RelocKind::Data32 => "R_RAISIN64_DATA32",
        }
    }

    /// Bytes patched in the instruction word; `None` for kinds that never apply to one.
    pub fn width(self) -> Option<u8> {
        match self {
            RelocKind::Abs56 => Some(7),
            RelocKind::Pcrel32 => Some(4),
            RelocKind::Pcrel12 => Some(2),
            RelocKind::None | RelocKind::Data32 => None,
        }
    }
}

impl fmt::Display for RelocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field of an instruction word whose value is not known until symbols resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixup {
    /// Byte offset of the field within the 8-byte word.
    pub offset: u8,
    pub size: u8,
    pub expr: Expr,
    pub pcrel: bool,
    pub kind: RelocKind,
}

impl Fixup {
    pub fn pcrel32(expr: Expr) -> Self {
        Self { offset: 4, size: 4, expr, pcrel: true, kind: RelocKind::Pcrel32 }
    }

    pub fn abs56(expr: Expr) -> Self {
        Self { offset: 1, size: 7, expr, pcrel: false, kind: RelocKind::Abs56 }
    }
}

/// Patch `value` into `word` at the fixup's offset.
///
/// PC-relative values arrive as byte distances from the instruction start and are stored
/// in 2-byte units, so they must be even. Range and alignment failures leave `word`
/// untouched.
pub fn apply_fixup(word: &mut [u8], fixup: &Fixup, value: i64) -> Result<(), RelocError> {
    let kind = fixup.kind;
    let width = kind.width().ok_or(RelocError::Unsupported(kind))?;
    if fixup.size != width {
        return Err(RelocError::SizeMismatch { kind, size: fixup.size });
    }
    let range = || RelocError::Range { kind, value };
    let off = fixup.offset as usize;
    let field = word.get_mut(off..off + width as usize).ok_or_else(range)?;
    match kind {
        RelocKind::Abs56 => {
            if !(0..1i64 << 56).contains(&value) {
                return Err(range());
            }
            field.copy_from_slice(&value.to_be_bytes()[1..]);
        }
        RelocKind::Pcrel32 => {
            let v = i32::try_from(value >> 1).map_err(|_| range())?;
            if value & 1 != 0 {
                return Err(RelocError::Misaligned { kind, value });
            }
            field.copy_from_slice(&v.to_be_bytes());
        }
        RelocKind::Pcrel12 => {
            if value == 0 {
                return Ok(());
            }
            if !(-4096..=4097).contains(&value) {
                return Err(range());
            }
            if value & 1 != 0 {
                return Err(RelocError::Misaligned { kind, value });
            }
            let old = u16::from_be_bytes([field[0], field[1]]);
            let new = old | ((value >> 1) as u16 & 0x0fff);
            field.copy_from_slice(&new.to_be_bytes());
        }
        RelocKind::None | RelocKind::Data32 => return Err(RelocError::Unsupported(kind)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_numbers() {
        assert_eq!(RelocKind::Abs56.to_string(), "R_RAISIN64_56");
        assert_eq!(RelocKind::Pcrel12.elf_type(), 3);
    }

    #[test]
    fn pcrel12_ors_into_existing_bits() {
        let mut w = [0u8; 8];
        w[0] = 0xa0;
        let fx = Fixup { offset: 0, size: 2, expr: Expr::constant(0), pcrel: true, kind: RelocKind::Pcrel12 };
        apply_fixup(&mut w, &fx, -2).unwrap();
        assert_eq!(&w[..2], &[0xaf, 0xff]);
    }
}
