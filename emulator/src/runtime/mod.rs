use tracing::{debug, info};

use crate::constants::{Address, STACK_DEPTH};

mod exception;
mod instructions;
mod keypad;
mod memory;
mod opcode;
mod quirks;
mod registers;
mod screen;
mod timers;

pub use self::exception::Exception;
pub use self::instructions::Instruction;
pub use self::keypad::Keypad;
pub use self::memory::{Memory, MemoryError};
pub use self::opcode::Opcode;
pub use self::quirks::{KeyPolicy, Quirks};
pub use self::registers::{Reg, Registers};
pub use self::screen::{Screen, SpriteEdge};
pub use self::timers::Timers;

/// The interpreter state machine.
///
/// Owns every piece of machine state and exposes the operations the host
/// drives: loading a program, stepping the CPU, ticking the 60 Hz timers and
/// reporting key edges. The host decides the pacing; one [`Machine::step`]
/// call executes exactly one instruction.
#[derive(Debug, Clone)]
pub struct Machine {
    pub registers: Registers,
    pub memory: Memory,
    pub timers: Timers,
    pub keypad: Keypad,
    pub screen: Screen,
    pub quirks: Quirks,
    stack: [Address; STACK_DEPTH],
    sp: usize,

    /// Number of instructions executed since the last reset
    pub cycles: usize,
}

impl Default for Machine {
    fn default() -> Self {
        Self {
            registers: Registers::default(),
            memory: Memory::default(),
            timers: Timers::default(),
            keypad: Keypad::default(),
            screen: Screen::default(),
            quirks: Quirks::default(),
            stack: [0; STACK_DEPTH],
            sp: 0,
            cycles: 0,
        }
    }
}

impl Machine {
    #[must_use]
    pub fn new(quirks: Quirks) -> Self {
        Self {
            quirks,
            ..Self::default()
        }
    }

    /// Reset to power-on state, keeping the configured quirks.
    ///
    /// Deterministic: zeroed registers and timers, font loaded, pc at 0x200.
    pub fn reset(&mut self) {
        info!("resetting machine");
        *self = Self::new(self.quirks);
    }

    /// Copy a raw program image at 0x200
    ///
    /// # Errors
    ///
    /// Fails with [`MemoryError::ProgramTooLarge`] if the image does not fit.
    pub fn load_program(&mut self, image: &[u8]) -> Result<(), MemoryError> {
        info!(len = image.len(), "loading program image");
        self.memory.load_program(image)
    }

    /// Run one fetch-decode-execute cycle.
    ///
    /// The program counter advances by 2 before the instruction executes;
    /// jumps, calls, returns and skips overwrite or extend it afterwards.
    ///
    /// # Errors
    ///
    /// Surfaces the [`Exception`] of a faulting instruction. The machine
    /// stays intact and the host may keep stepping.
    pub fn step(&mut self) -> Result<(), Exception> {
        let opcode = Opcode(self.memory.read_word(self.registers.pc)?);
        self.registers.pc = self.registers.pc.wrapping_add(2);

        let instruction = Instruction::decode(opcode);
        debug!(cycle = self.cycles, "executing \"{}\"", instruction);
        instruction.execute(self)?;
        self.cycles += 1;
        Ok(())
    }

    /// Advance the timers by one 60 Hz tick.
    ///
    /// Returns `true` when the sound timer just hit zero, the one moment the
    /// host should emit a beep.
    pub fn tick_timers(&mut self) -> bool {
        self.timers.tick()
    }

    /// Report a key press. Key indices are taken modulo 16.
    pub fn key_down(&mut self, key: u8) {
        self.keypad.press(key);
    }

    /// Report a key release. Key indices are taken modulo 16.
    pub fn key_up(&mut self, key: u8) {
        self.keypad.release(key);
    }

    /// The framebuffer, for the host renderer
    #[must_use]
    pub fn framebuffer(&self) -> &Screen {
        &self.screen
    }

    /// Consume the framebuffer dirty flag; `true` means re-present
    pub fn take_dirty(&mut self) -> bool {
        self.screen.take_dirty()
    }

    /// Current call stack depth, for the debugger
    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.sp
    }

    /// Read a named register, for the debugger
    #[must_use]
    pub fn register(&self, reg: Reg) -> u16 {
        match reg {
            Reg::I => self.registers.i,
            Reg::PC => self.registers.pc,
            Reg::DT => u16::from(self.timers.delay),
            Reg::ST => u16::from(self.timers.sound),
            // The remaining variants are v0–vF, declared first and in order
            v => u16::from(self.registers.v[v as usize]),
        }
    }

    /// Value of the general register vX
    pub(crate) fn v(&self, x: u8) -> u8 {
        self.registers.v[usize::from(x)]
    }

    pub(crate) fn v_mut(&mut self, x: u8) -> &mut u8 {
        &mut self.registers.v[usize::from(x)]
    }

    /// Skip the next instruction
    pub(crate) fn skip(&mut self) {
        self.registers.pc = self.registers.pc.wrapping_add(2);
    }

    pub(crate) fn push(&mut self, address: Address) -> Result<(), Exception> {
        if self.sp == STACK_DEPTH {
            return Err(Exception::StackOverflow { depth: STACK_DEPTH });
        }
        self.stack[self.sp] = address;
        self.sp += 1;
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<Address, Exception> {
        self.sp = self.sp.checked_sub(1).ok_or(Exception::StackUnderflow)?;
        Ok(self.stack[self.sp])
    }
}
