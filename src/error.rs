use crate::reloc::RelocKind;

/// Line-fatal assembly errors. The offending line produces no output.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("unknown opcode `{0}`")]
    UnknownOpcode(String),
    #[error("expecting comma delimited operands")]
    ExpectingComma,
    #[error("illegal register number `{0}`")]
    IllegalRegisterNumber(String),
    #[error("bad expression `{0}`")]
    BadExpression(String),
    #[error("expression `{0}` must be an assembly-time constant")]
    ExpressionNotConstant(String),
    #[error("malformed operand `{0}`")]
    MalformedOperand(String),
    #[error("symbol `{0}` is already defined")]
    DuplicateSymbol(String),
    #[error("branch offset {0} is not a multiple of 2")]
    MisalignedBranch(i64),
    #[error("address space exhausted")]
    AddressSpaceExhausted,
}

/// Non-fatal assembly diagnostics; the instruction is still emitted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmWarning {
    #[error("extra stuff on line ignored: `{0}`")]
    ExtraStuffIgnored(String),
    #[error("immediate {value} does not fit in 32 bits, truncated")]
    ImmediateTruncated { value: i64 },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RelocError {
    #[error("{kind} value {value} out of range")]
    Range { kind: RelocKind, value: i64 },
    #[error("{kind} value {value} is not a multiple of 2")]
    Misaligned { kind: RelocKind, value: i64 },
    /// Internal consistency failure; the caller must abort.
    #[error("{kind} can not patch a {size}-byte field")]
    SizeMismatch { kind: RelocKind, size: u8 },
    /// Internal consistency failure; the caller must abort.
    #[error("relocation {0} can not be applied to an instruction")]
    Unsupported(RelocKind),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("no memory mapped at {addr:#010x} ({len} bytes)")]
    Unmapped { addr: u64, len: usize },
}
