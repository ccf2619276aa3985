use std::collections::HashMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Operand layout of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    /// No operands.
    None,
    /// rd, rs1, rs2
    Ds1s2,
    /// rs1
    S1,
    /// rd, rd2, rs1, rs2 (wide multiply/divide: high and low halves)
    Dd2s1s2,
    /// rd, rs1, imm
    Ds1i,
    /// rd, imm (load upper immediate)
    Di,
    /// rd, offset(rs1)
    Mds1i,
    /// rd, rs1, pc-relative offset
    Bds1i,
    /// absolute jump target
    Ji,
    /// rd, rs1, rs2, function selector (FPU dispatch)
    Ds1s2i,
    /// Reserved opcode.
    Bad,
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpFlags: u8 {
const NARROW16 = 1 << 0; // has a 16-bit form, selected through NARROW16_MAP
const NARROW32 = 1 << 1; // has a 32-bit form with the same opcode
const SIGNED = 1 << 2;   // immediate is sign-extended
}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpcodeEntry {
    pub opcode: u8,
    pub name: &'static str,
    pub shape: Shape,
    pub flags: OpFlags,
    /// Index into `NARROW16_MAP`; meaningful only when `NARROW16` is set.
    pub opcode16: u8,
}

impl OpcodeEntry {
    pub fn narrow16(&self) -> bool {
        self.flags.contains(OpFlags::NARROW16)
    }

    pub fn narrow32(&self) -> bool {
        self.flags.contains(OpFlags::NARROW32)
    }

    pub fn signed(&self) -> bool {
        self.flags.contains(OpFlags::SIGNED)
    }

    pub fn is_bad(&self) -> bool {
        self.shape == Shape::Bad
    }
}

const fn op(
    opcode: u8,
    shape: Shape,
    narrow16: Option<u8>,
    narrow32: bool,
    signed: bool,
    name: &'static str,
) -> OpcodeEntry {
    let mut bits = 0;
    if narrow16.is_some() {
        bits |= OpFlags::NARROW16.bits();
    }
    if narrow32 {
        bits |= OpFlags::NARROW32.bits();
    }
    if signed {
        bits |= OpFlags::SIGNED.bits();
    }
    let opcode16 = match narrow16 {
        Some(sel) => sel,
        None => 0,
    };
    OpcodeEntry { opcode, name, shape, flags: OpFlags::from_bits_retain(bits), opcode16 }
}

const fn bad(opcode: u8) -> OpcodeEntry {
    op(opcode, Shape::Bad, None, true, false, "bad")
}

use Shape as S;

/// Every instruction has a 64-bit form; the flags only describe the narrower ones.
pub static OPCODES: [OpcodeEntry; 64] = [
    op(0x00, S::Ds1s2, Some(0), true, false, "add"),
    op(0x01, S::Ds1s2, Some(1), true, false, "sub"),
    bad(0x02),
    bad(0x03),
    op(0x04, S::Ds1s2, None, true, false, "slt"),
    op(0x05, S::Ds1s2, None, true, false, "sltu"),
    op(0x06, S::Ds1s2, None, true, false, "sgt"),
    op(0x07, S::Ds1s2, None, true, false, "sgtu"),
    op(0x08, S::Ds1s2, None, true, false, "sll"),
    op(0x09, S::Ds1s2, None, true, false, "sra"),
    op(0x0a, S::Ds1s2, None, true, false, "srl"),
    bad(0x0b),
    op(0x0c, S::Ds1s2, None, true, false, "and"),
    op(0x0d, S::Ds1s2, None, true, false, "nor"),
    op(0x0e, S::Ds1s2, None, true, false, "or"),
    op(0x0f, S::Ds1s2, None, true, false, "xor"),
    op(0x10, S::Dd2s1s2, None, true, false, "mul"),
    op(0x11, S::Dd2s1s2, None, true, false, "mulu"),
    op(0x12, S::Dd2s1s2, None, true, false, "div"),
    op(0x13, S::Dd2s1s2, None, true, false, "divu"),
    bad(0x14),
    bad(0x15),
    bad(0x16),
    bad(0x17),
    bad(0x18),
    bad(0x19),
    bad(0x1a),
    bad(0x1b),
    op(0x1c, S::None, Some(4), true, false, "syscall"),
    op(0x1d, S::Ds1s2i, None, false, false, "f*"),
    op(0x1e, S::S1, Some(6), true, false, "jal"),
    op(0x1f, S::S1, Some(5), true, false, "j"),
    op(0x20, S::Ds1i, Some(2), true, true, "addi"),
    op(0x21, S::Ds1i, Some(3), true, true, "subi"),
    bad(0x22),
    bad(0x23),
    op(0x24, S::Ds1i, None, true, true, "slti"),
    op(0x25, S::Ds1i, None, true, false, "sltiu"),
    op(0x26, S::Ds1i, None, true, true, "sgti"),
    op(0x27, S::Ds1i, None, true, false, "sgtiu"),
    op(0x28, S::Ds1i, None, true, false, "slli"),
    op(0x29, S::Ds1i, None, true, false, "srai"),
    op(0x2a, S::Ds1i, None, true, false, "srli"),
    bad(0x2b),
    op(0x2c, S::Ds1i, None, true, false, "andi"),
    op(0x2d, S::Ds1i, None, true, false, "nori"),
    op(0x2e, S::Ds1i, None, true, false, "ori"),
    op(0x2f, S::Ds1i, None, true, false, "xori"),
    op(0x30, S::Mds1i, None, true, true, "lw"),
    op(0x31, S::Mds1i, None, true, true, "l32"),
    op(0x32, S::Mds1i, None, true, true, "l16"),
    op(0x33, S::Mds1i, None, true, true, "l8"),
    op(0x34, S::Di, None, false, false, "lui"),
    op(0x35, S::Mds1i, None, true, true, "l32s"),
    op(0x36, S::Mds1i, None, true, true, "l16s"),
    op(0x37, S::Mds1i, None, true, true, "l8s"),
    op(0x38, S::Mds1i, None, true, true, "sw"),
    op(0x39, S::Mds1i, None, true, true, "s32"),
    op(0x3a, S::Mds1i, None, true, true, "s16"),
    op(0x3b, S::Mds1i, None, true, true, "s8"),
    op(0x3c, S::Bds1i, None, true, true, "beq"),
    op(0x3d, S::Bds1i, None, true, true, "beqal"),
    op(0x3e, S::Ji, None, false, false, "jali"),
    op(0x3f, S::Ji, None, false, false, "ji"),
];

/// 16-bit selector -> full opcode.
pub const NARROW16_MAP: [u8; 8] = [0x00, 0x01, 0x20, 0x21, 0x1c, 0x1f, 0x1e, 0x14];

/// Opcode metadata with a mnemonic index. Build once, share by reference.
#[derive(Debug, Clone)]
pub struct OpcodeTable {
    by_name: HashMap<&'static str, &'static OpcodeEntry>,
}

impl OpcodeTable {
    pub fn new() -> Self {
        let mut by_name = HashMap::with_capacity(OPCODES.len());
        for entry in OPCODES.iter() {
            // "bad" appears many times; keep the lowest opcode
            by_name.entry(entry.name).or_insert(entry);
        }
        Self { by_name }
    }

    /// Case-sensitive mnemonic lookup. Reserved entries are returned too.
    pub fn lookup(&self, mnemonic: &str) -> Option<&'static OpcodeEntry> {
        self.by_name.get(mnemonic).copied()
    }

    /// Only the low six bits of `opcode` are used.
    pub fn by_opcode(&self, opcode: u8) -> &'static OpcodeEntry {
        &OPCODES[(opcode & 0x3f) as usize]
    }

    /// Only the low three bits of `selector` are used.
    pub fn narrow(&self, selector: u8) -> &'static OpcodeEntry {
        self.by_opcode(NARROW16_MAP[(selector & 0x7) as usize])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static OpcodeEntry> {
        OPCODES.iter()
    }
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::new()
    }
}
