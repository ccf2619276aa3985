use serde::{Deserialize, Serialize};

use crate::isa::fields::sign_extend;
use crate::opcodes::{OpcodeEntry, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Width {
    W16 = 2,
    W32 = 4,
    W64 = 8,
}

impl Width {
    /// Size class from the tag in the top bits of an 8-byte big-endian read.
    pub fn of(raw: u64) -> Self {
        match raw >> 62 {
            0b11 => Width::W64,
            0b10 => Width::W32,
            _ => Width::W16,
        }
    }

    pub fn bytes(self) -> usize {
        self as usize
    }
}

/// Instruction fields pulled out of a raw word. Which of them are meaningful depends on
/// `entry.shape` and `width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decoded {
    pub entry: &'static OpcodeEntry,
    pub width: Width,
    pub rd: u8,
    pub rd2: u8,
    pub rs1: u8,
    pub rs2: u8,
    /// Raw immediate field, zero-extended.
    pub imm: u64,
}

impl Decoded {
    pub fn new(entry: &'static OpcodeEntry, width: Width) -> Self {
        Self { entry, width, rd: 0, rd2: 0, rs1: 0, rs2: 0, imm: 0 }
    }

    pub fn imm_bits(&self) -> u32 {
        match (self.width, self.entry.shape) {
            (Width::W64, Shape::Ji) => 56,
            (Width::W16, _) => 6,
            (Width::W32, _) => 12,
            (Width::W64, _) => 32,
        }
    }

    /// Immediate sign-extended from its field width.
    pub fn simm(&self) -> i64 {
        sign_extend(self.imm, self.imm_bits())
    }

    /// Whether the entry has a legal encoding at this width. Reserved opcodes never do.
    pub fn is_valid(&self) -> bool {
        let e = self.entry;
        match self.width {
            _ if e.is_bad() => false,
            Width::W16 => {
                e.narrow16()
                    && matches!(e.shape, Shape::None | Shape::Ds1s2 | Shape::Ds1i | Shape::S1)
            }
            // JI, DS1S2I and DI carry no 32-bit flag
            Width::W32 => e.narrow32(),
            Width::W64 => true,
        }
    }
}

pub trait Decoder {
    fn decode(&self, raw: u64) -> Decoded;
}
