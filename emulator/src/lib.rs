pub mod constants;
pub mod runtime;

pub use self::runtime::{Exception, Instruction, Machine, MemoryError, Opcode, Quirks};
