//! Bit layout of raisin64 instruction words.
//!
//! Positions are counted from the most significant bit of the 8-byte big-endian read
//! (index 0 = bit 63). Narrow instructions sit in the leading bytes of that read, so a
//! 32-bit instruction's register fields are found at the same indices as in the
//! 64-bit form.

use bitvec::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub start: usize,
    pub len: usize,
}

impl Field {
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    fn mask(self) -> u64 {
        if self.len >= 64 { u64::MAX } else { (1u64 << self.len) - 1 }
    }

    pub fn get(self, raw: u64) -> u64 {
        let bytes = raw.to_be_bytes();
        bytes.view_bits::<Msb0>()[self.start..self.start + self.len].load_be::<u64>()
    }

    /// Store the low `len` bits of `value`.
    pub fn set(self, raw: &mut u64, value: u64) {
        let mut bytes = raw.to_be_bytes();
        bytes.view_bits_mut::<Msb0>()[self.start..self.start + self.len]
            .store_be::<u64>(value & self.mask());
        *raw = u64::from_be_bytes(bytes);
    }
}

pub fn sign_extend(v: u64, bits: u32) -> i64 {
    let s = 64 - bits;
    ((v << s) as i64) >> s
}

pub mod w64 {
    use super::Field;

    pub const TAG: u64 = 0b11;
    pub const SIZE: Field = Field::new(0, 2);
    pub const OPCODE: Field = Field::new(2, 6);
    pub const RD: Field = Field::new(8, 6);
    pub const RD2: Field = Field::new(14, 6);
    pub const RS1: Field = Field::new(20, 6);
    pub const RS2: Field = Field::new(26, 6);
    pub const IMM: Field = Field::new(32, 32);
    /// JI: absolute target in the low seven bytes.
    pub const TARGET: Field = Field::new(8, 56);
}

pub mod w32 {
    use super::Field;

    pub const TAG: u64 = 0b10;
    pub const SIZE: Field = Field::new(0, 2);
    pub const OPCODE: Field = Field::new(2, 6);
    pub const RD: Field = Field::new(8, 6);
    pub const RD2: Field = Field::new(14, 6);
    pub const RS1: Field = Field::new(20, 6);
    pub const RS2: Field = Field::new(26, 6);
    // imm12 is split across the rd2 and rs2 slots
    pub const IMM_HI: Field = Field::new(14, 6);
    pub const IMM_LO: Field = Field::new(26, 6);
}

pub mod w16 {
    use super::Field;

    pub const SIZE: Field = Field::new(0, 1);
    pub const SELECTOR: Field = Field::new(1, 3);
    /// dest and src1 share one field
    pub const RD: Field = Field::new(4, 6);
    pub const RS2: Field = Field::new(10, 6);
    pub const IMM: Field = Field::new(10, 6);
}
