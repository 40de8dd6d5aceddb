use thiserror::Error;

use super::memory::MemoryError;

/// Faults raised while executing an instruction.
///
/// The reference hardware leaves all of these undefined; surfacing them as
/// explicit errors is part of this machine's contract. The program counter has
/// already advanced past the faulting instruction, so the host may halt,
/// reset, or ignore and keep stepping.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    /// A `call` was issued with the call stack already full
    #[error("call stack overflow (depth {depth})")]
    StackOverflow { depth: usize },

    /// A `ret` was issued with an empty call stack
    #[error("return with an empty call stack")]
    StackUnderflow,

    /// An instruction touched memory outside the address space
    #[error("invalid memory access ({0})")]
    InvalidMemoryAccess(#[from] MemoryError),

    /// A key instruction named a key outside 0x0–0xF
    #[error("key index {key:#04X} out of range")]
    InvalidKey { key: u8 },
}
