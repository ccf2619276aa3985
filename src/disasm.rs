use serde::Serialize;

use crate::decoder::{Decoded, Decoder};
use crate::isa::r64::R64Decoder;
use crate::opcodes::{OpcodeTable, Shape};
use crate::regs::reg_name;

/// Rendered instruction and the number of bytes it occupies (2, 4 or 8).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Disassembly {
    pub text: String,
    pub len: usize,
}

impl From<&Decoded> for Disassembly {
    fn from(d: &Decoded) -> Self {
        Self { text: fmt_decoded(d), len: d.width.bytes() }
    }
}

pub fn disassemble_word(table: &OpcodeTable, raw: u64) -> Disassembly {
    Disassembly::from(&R64Decoder::new(table).decode(raw))
}

pub fn fmt_decoded(d: &Decoded) -> String {
    if !d.is_valid() {
        return "bad".to_string();
    }
    let mn = d.entry.name;
    let (rd, rd2, rs1, rs2) = (reg_name(d.rd), reg_name(d.rd2), reg_name(d.rs1), reg_name(d.rs2));
    match d.entry.shape {
        Shape::None => mn.to_string(),
        Shape::Ds1s2 => format!("{mn}\t{rd}, {rs1}, {rs2}"),
        Shape::S1 => format!("{mn}\t{rs1}"),
        Shape::Dd2s1s2 => format!("{mn}\t{rd}, {rd2}, {rs1}, {rs2}"),
        Shape::Ds1i => format!("{mn}\t{rd}, {rs1}, {}", imm(d)),
        Shape::Di => format!("{mn}\t{rd}, {}", imm(d)),
        Shape::Mds1i => format!("{mn}\t{rd}, {}({rs1})", d.simm()),
        // offset counts 2-byte units
        Shape::Bds1i => format!("{mn}\t{rd}, {rs1}, {}", d.simm() << 1),
        Shape::Ji => format!("{mn}\t{:#x}", d.imm),
        Shape::Ds1s2i => format!("{mn}\t{rd}, {rs1}, {rs2}, {:#x}", d.imm),
        Shape::Bad => "bad".to_string(),
    }
}

fn imm(d: &Decoded) -> String {
    if d.entry.signed() { d.simm().to_string() } else { format!("{:#x}", d.imm) }
}
