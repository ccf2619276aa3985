use serde::{Deserialize, Serialize};

use crate::decoder::Decoder;
use crate::disasm::Disassembly;
use crate::error::MemoryError;

/// Byte-addressed memory. raisin64 is big-endian; the wide accessors compose bytes in
/// that order.
pub trait Bus {
    fn read_u8(&self, addr: u64) -> Result<u8, MemoryError>;
    fn write_u8(&mut self, addr: u64, val: u8) -> Result<(), MemoryError>;

    fn read_u16(&self, addr: u64) -> Result<u16, MemoryError> {
        Ok(u16::from_be_bytes(self.read_array(addr)?))
    }

    fn read_u32(&self, addr: u64) -> Result<u32, MemoryError> {
        Ok(u32::from_be_bytes(self.read_array(addr)?))
    }

    fn read_u64(&self, addr: u64) -> Result<u64, MemoryError> {
        Ok(u64::from_be_bytes(self.read_array(addr)?))
    }

    fn write_u64(&mut self, addr: u64, val: u64) -> Result<(), MemoryError> {
        for (i, b) in val.to_be_bytes().into_iter().enumerate() {
            self.write_u8(addr.wrapping_add(i as u64), b)?;
        }
        Ok(())
    }

    fn read_array<const N: usize>(&self, addr: u64) -> Result<[u8; N], MemoryError> {
        let mut out = [0u8; N];
        for (i, b) in out.iter_mut().enumerate() {
            *b = self
                .read_u8(addr.wrapping_add(i as u64))
                .map_err(|_| MemoryError::Unmapped { addr, len: N })?;
        }
        Ok(out)
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LinearMemory {
    pub mem: Vec<u8>,
    pub base: u64,
}

impl LinearMemory {
    pub fn new(size: usize) -> Self {
        Self { mem: vec![0; size], base: 0 }
    }

    pub fn with_bytes(base: u64, bytes: &[u8]) -> Self {
        Self { mem: bytes.to_vec(), base }
    }

    fn offset(&self, addr: u64) -> Result<usize, MemoryError> {
        addr.checked_sub(self.base)
            .map(|off| off as usize)
            .filter(|&off| off < self.mem.len())
            .ok_or(MemoryError::Unmapped { addr, len: 1 })
    }
}

impl Bus for LinearMemory {
    fn read_u8(&self, addr: u64) -> Result<u8, MemoryError> {
        Ok(self.mem[self.offset(addr)?])
    }

    fn write_u8(&mut self, addr: u64, val: u8) -> Result<(), MemoryError> {
        let off = self.offset(addr)?;
        self.mem[off] = val;
        Ok(())
    }
}

/// Read eight bytes at `addr` and render the instruction found there. The read is always
/// eight bytes wide, even when the instruction turns out to be narrower.
pub fn disassemble_at<B: Bus, D: Decoder>(
    bus: &B,
    dec: &D,
    addr: u64,
) -> Result<Disassembly, MemoryError> {
    let raw = bus.read_u64(addr)?;
    Ok(Disassembly::from(&dec.decode(raw)))
}
