pub mod assembler;
pub mod decoder;
pub mod disasm;
pub mod encoder;
pub mod error;
pub mod expr;
pub mod memory;
pub mod opcodes;
pub mod regs;
pub mod reloc;

pub mod isa {
    pub mod fields; // bit layout shared by decoder and encoder
    pub mod r64;
}

pub use assembler::{Assembler, AssemblerConfig, Assembly};
pub use decoder::{Decoded, Decoder, Width};
pub use disasm::{disassemble_word, Disassembly};
pub use encoder::{Assembled, Encoder};
pub use error::{AsmError, AsmWarning, MemoryError, RelocError};
pub use memory::{disassemble_at, Bus, LinearMemory};
pub use opcodes::{OpcodeEntry, OpcodeTable, Shape};
pub use reloc::{Fixup, RelocKind};
