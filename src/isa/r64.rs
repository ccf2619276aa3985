use tracing::trace;

use crate::decoder::{Decoded, Decoder, Width};
use crate::isa::fields::{w16, w32, w64};
use crate::opcodes::{OpcodeTable, Shape};

/// raisin64 decoder for the 16-, 32- and 64-bit forms.
pub struct R64Decoder<'t> {
    table: &'t OpcodeTable,
}

impl<'t> R64Decoder<'t> {
    pub fn new(table: &'t OpcodeTable) -> Self {
        Self { table }
    }
}

impl Decoder for R64Decoder<'_> {
    fn decode(&self, raw: u64) -> Decoded {
        let width = Width::of(raw);
        let d = match width {
            Width::W16 => {
                let entry = self.table.narrow(w16::SELECTOR.get(raw) as u8);
                let r = w16::RD.get(raw) as u8;
                Decoded {
                    entry,
                    width,
                    rd: r,
                    rd2: 0,
                    rs1: r,
                    rs2: w16::RS2.get(raw) as u8,
                    imm: w16::IMM.get(raw),
                }
            }
            Width::W32 => Decoded {
                entry: self.table.by_opcode(w32::OPCODE.get(raw) as u8),
                width,
                rd: w32::RD.get(raw) as u8,
                rd2: w32::RD2.get(raw) as u8,
                rs1: w32::RS1.get(raw) as u8,
                rs2: w32::RS2.get(raw) as u8,
                imm: (w32::IMM_HI.get(raw) << 6) | w32::IMM_LO.get(raw),
            },
            Width::W64 => {
                let entry = self.table.by_opcode(w64::OPCODE.get(raw) as u8);
                let imm = if entry.shape == Shape::Ji { w64::TARGET.get(raw) } else { w64::IMM.get(raw) };
                Decoded {
                    entry,
                    width,
                    rd: w64::RD.get(raw) as u8,
                    rd2: w64::RD2.get(raw) as u8,
                    rs1: w64::RS1.get(raw) as u8,
                    rs2: w64::RS2.get(raw) as u8,
                    imm,
                }
            }
        };
        trace!("{raw:#018x} -> {} ({width:?})", d.entry.name);
        d
    }
}

/// Inverse of `decode`: lay the fields of `d` out in its width. The narrow forms end up in
/// the leading bytes of the returned value.
pub fn pack(d: &Decoded) -> u64 {
    let e = d.entry;
    let mut raw = 0u64;
    match d.width {
        Width::W16 => {
            w16::SIZE.set(&mut raw, 0);
            w16::SELECTOR.set(&mut raw, e.opcode16 as u64);
            let combined = if e.shape == Shape::S1 { d.rs1 } else { d.rd };
            w16::RD.set(&mut raw, combined as u64);
            if e.shape == Shape::Ds1i {
                w16::IMM.set(&mut raw, d.imm);
            } else {
                w16::RS2.set(&mut raw, d.rs2 as u64);
            }
        }
        Width::W32 => {
            w32::SIZE.set(&mut raw, w32::TAG);
            w32::OPCODE.set(&mut raw, e.opcode as u64);
            w32::RD.set(&mut raw, d.rd as u64);
            w32::RS1.set(&mut raw, d.rs1 as u64);
            match e.shape {
                Shape::Ds1i | Shape::Mds1i | Shape::Bds1i | Shape::Di => {
                    w32::IMM_HI.set(&mut raw, d.imm >> 6);
                    w32::IMM_LO.set(&mut raw, d.imm);
                }
                _ => {
                    w32::RD2.set(&mut raw, d.rd2 as u64);
                    w32::RS2.set(&mut raw, d.rs2 as u64);
                }
            }
        }
        Width::W64 => {
            w64::SIZE.set(&mut raw, w64::TAG);
            w64::OPCODE.set(&mut raw, e.opcode as u64);
            if e.shape == Shape::Ji {
                w64::TARGET.set(&mut raw, d.imm);
            } else {
                w64::RD.set(&mut raw, d.rd as u64);
                w64::RD2.set(&mut raw, d.rd2 as u64);
                w64::RS1.set(&mut raw, d.rs1 as u64);
                w64::RS2.set(&mut raw, d.rs2 as u64);
                w64::IMM.set(&mut raw, d.imm);
            }
        }
    }
    raw
}
