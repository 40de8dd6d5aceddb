use parse_display::Display;
use thiserror::Error;

use crate::constants::{Address, PROGRAM_START};

/// The register file: sixteen 8-bit general registers, the index register and
/// the program counter.
///
/// `vF` doubles as the carry/borrow/collision flag and is overwritten by every
/// instruction that defines a flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    /// General purpose registers v0–vF
    pub v: [u8; 16],

    /// Index register. May transiently hold values beyond 0xFFF; using it as
    /// a pointer past the address space is a fault.
    pub i: Address,

    /// Program counter
    pub pc: Address,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
        }
    }
}

impl Registers {
    /// Set the vF flag register
    pub(crate) fn set_flag(&mut self, flag: bool) {
        self.v[0xF] = u8::from(flag);
    }
}

impl std::fmt::Display for Registers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "v = {:02X?} | i = {:#05X} | pc = {:#05X}",
            self.v, self.i, self.pc
        )
    }
}

/// A named machine register, for the debugger surface.
///
/// The delay and sound timers are addressable here even though they live
/// outside the register file proper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(style = "lowercase")]
pub enum Reg {
    V0,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
    V7,
    V8,
    V9,
    VA,
    VB,
    VC,
    VD,
    VE,
    VF,

    /// Index register
    I,

    /// Program counter
    PC,

    /// Delay timer
    DT,

    /// Sound timer
    ST,
}

#[derive(Error, Debug)]
#[error("could not parse register")]
pub struct RegisterParseError;

impl std::str::FromStr for Reg {
    type Err = RegisterParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "v0" => Ok(Reg::V0),
            "v1" => Ok(Reg::V1),
            "v2" => Ok(Reg::V2),
            "v3" => Ok(Reg::V3),
            "v4" => Ok(Reg::V4),
            "v5" => Ok(Reg::V5),
            "v6" => Ok(Reg::V6),
            "v7" => Ok(Reg::V7),
            "v8" => Ok(Reg::V8),
            "v9" => Ok(Reg::V9),
            "va" => Ok(Reg::VA),
            "vb" => Ok(Reg::VB),
            "vc" => Ok(Reg::VC),
            "vd" => Ok(Reg::VD),
            "ve" => Ok(Reg::VE),
            "vf" => Ok(Reg::VF),
            "i" => Ok(Reg::I),
            "pc" => Ok(Reg::PC),
            "dt" => Ok(Reg::DT),
            "st" => Ok(Reg::ST),
            _ => Err(RegisterParseError),
        }
    }
}
