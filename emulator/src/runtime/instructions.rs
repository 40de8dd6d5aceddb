use parse_display::Display;
use tracing::{debug, warn};

use crate::constants::{Address, FONT_GLYPH_SIZE, FONT_START};

use super::exception::Exception;
use super::opcode::Opcode;
use super::quirks::KeyPolicy;
use super::Machine;

/// The decoded instruction set, one variant per opcode kind.
///
/// The `Display` rendering uses the conventional assembly mnemonics, which is
/// what the disassembler and the debugger `list` command print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Instruction {
    /// 00E0 - Clear the screen
    #[display("cls")]
    Cls,

    /// 00EE - Return from a subroutine
    #[display("ret")]
    Ret,

    /// 1NNN - Jump to an address
    #[display("jp   {0:#05X}")]
    Jp(Address),

    /// 2NNN - Call a subroutine
    #[display("call {0:#05X}")]
    Call(Address),

    /// 3XNN - Skip the next instruction if vX equals the immediate
    #[display("se   v{0:X}, {1:#04X}")]
    SeByte(u8, u8),

    /// 4XNN - Skip the next instruction if vX differs from the immediate
    #[display("sne  v{0:X}, {1:#04X}")]
    SneByte(u8, u8),

    /// 5XY0 - Skip the next instruction if vX equals vY
    #[display("se   v{0:X}, v{1:X}")]
    SeReg(u8, u8),

    /// 9XY0 - Skip the next instruction if vX differs from vY
    #[display("sne  v{0:X}, v{1:X}")]
    SneReg(u8, u8),

    /// 6XNN - Load an immediate into vX
    #[display("ld   v{0:X}, {1:#04X}")]
    LdByte(u8, u8),

    /// 7XNN - Add an immediate to vX, without touching the flag
    #[display("add  v{0:X}, {1:#04X}")]
    AddByte(u8, u8),

    /// 8XY0 - Copy vY into vX
    #[display("ld   v{0:X}, v{1:X}")]
    LdReg(u8, u8),

    /// 8XY1 - Bitwise `or` of vX and vY
    #[display("or   v{0:X}, v{1:X}")]
    Or(u8, u8),

    /// 8XY2 - Bitwise `and` of vX and vY
    #[display("and  v{0:X}, v{1:X}")]
    And(u8, u8),

    /// 8XY3 - Bitwise `xor` of vX and vY
    #[display("xor  v{0:X}, v{1:X}")]
    Xor(u8, u8),

    /// 8XY4 - Add vY to vX; vF becomes the carry
    #[display("add  v{0:X}, v{1:X}")]
    AddReg(u8, u8),

    /// 8XY5 - Subtract vY from vX; vF is 1 when no borrow occurred
    #[display("sub  v{0:X}, v{1:X}")]
    Sub(u8, u8),

    /// 8XY6 - Shift vX right; vF takes the bit shifted out
    #[display("shr  v{0:X}")]
    Shr(u8),

    /// 8XY7 - Set vX to vY minus vX; vF is 1 when no borrow occurred
    #[display("subn v{0:X}, v{1:X}")]
    Subn(u8, u8),

    /// 8XYE - Shift vX left; vF takes the bit shifted out
    #[display("shl  v{0:X}")]
    Shl(u8),

    /// ANNN - Load an address into the index register
    #[display("ld   i, {0:#05X}")]
    LdI(Address),

    /// BNNN - Jump to an address offset by v0
    #[display("jp   v0, {0:#05X}")]
    JpV0(Address),

    /// CXNN - Load a random byte masked by the immediate into vX
    #[display("rnd  v{0:X}, {1:#04X}")]
    Rnd(u8, u8),

    /// DXYN - Draw an N-row sprite from [i] at (vX, vY); vF reports collision
    #[display("drw  v{0:X}, v{1:X}, {2:X}")]
    Drw(u8, u8, u8),

    /// EX9E - Skip the next instruction if the key in vX is pressed
    #[display("skp  v{0:X}")]
    Skp(u8),

    /// EXA1 - Skip the next instruction if the key in vX is not pressed
    #[display("sknp v{0:X}")]
    Sknp(u8),

    /// FX07 - Read the delay timer into vX
    #[display("ld   v{0:X}, dt")]
    LdDt(u8),

    /// FX0A - Wait for a key press and store its index in vX
    #[display("ld   v{0:X}, k")]
    LdKey(u8),

    /// FX15 - Set the delay timer from vX
    #[display("ld   dt, v{0:X}")]
    SetDt(u8),

    /// FX18 - Set the sound timer from vX
    #[display("ld   st, v{0:X}")]
    SetSt(u8),

    /// FX1E - Add vX to the index register; vF is set when i leaves 0x000–0xFFF
    #[display("add  i, v{0:X}")]
    AddI(u8),

    /// FX29 - Point the index register at the font glyph for digit vX
    #[display("ld   f, v{0:X}")]
    LdFont(u8),

    /// FX33 - Store the three decimal digits of vX at [i], [i+1], [i+2]
    #[display("ld   b, v{0:X}")]
    LdBcd(u8),

    /// FX55 - Store v0..=vX at [i]; i advances past the stored range
    #[display("ld   [i], v{0:X}")]
    StoreRegs(u8),

    /// FX65 - Load v0..=vX from [i]; i advances past the loaded range
    #[display("ld   v{0:X}, [i]")]
    LoadRegs(u8),

    /// Any unassigned encoding; logged and executed as a no-op
    #[display("dw   {0:#06X}")]
    Unknown(u16),
}

impl Instruction {
    /// Decode a 16-bit instruction word.
    ///
    /// Total: every word maps to exactly one variant, with reserved encodings
    /// going to [`Instruction::Unknown`]. Never panics.
    #[must_use]
    pub fn decode(opcode: Opcode) -> Self {
        use Instruction::*;

        match opcode.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Cls,
            (0x0, 0x0, 0xE, 0xE) => Ret,
            (0x1, ..) => Jp(opcode.nnn()),
            (0x2, ..) => Call(opcode.nnn()),
            (0x3, ..) => SeByte(opcode.x(), opcode.nn()),
            (0x4, ..) => SneByte(opcode.x(), opcode.nn()),
            (0x5, .., 0x0) => SeReg(opcode.x(), opcode.y()),
            (0x6, ..) => LdByte(opcode.x(), opcode.nn()),
            (0x7, ..) => AddByte(opcode.x(), opcode.nn()),
            (0x8, .., 0x0) => LdReg(opcode.x(), opcode.y()),
            (0x8, .., 0x1) => Or(opcode.x(), opcode.y()),
            (0x8, .., 0x2) => And(opcode.x(), opcode.y()),
            (0x8, .., 0x3) => Xor(opcode.x(), opcode.y()),
            (0x8, .., 0x4) => AddReg(opcode.x(), opcode.y()),
            (0x8, .., 0x5) => Sub(opcode.x(), opcode.y()),
            (0x8, .., 0x6) => Shr(opcode.x()),
            (0x8, .., 0x7) => Subn(opcode.x(), opcode.y()),
            (0x8, .., 0xE) => Shl(opcode.x()),
            (0x9, .., 0x0) => SneReg(opcode.x(), opcode.y()),
            (0xA, ..) => LdI(opcode.nnn()),
            (0xB, ..) => JpV0(opcode.nnn()),
            (0xC, ..) => Rnd(opcode.x(), opcode.nn()),
            (0xD, ..) => Drw(opcode.x(), opcode.y(), opcode.n()),
            (0xE, _, 0x9, 0xE) => Skp(opcode.x()),
            (0xE, _, 0xA, 0x1) => Sknp(opcode.x()),
            (0xF, _, 0x0, 0x7) => LdDt(opcode.x()),
            (0xF, _, 0x0, 0xA) => LdKey(opcode.x()),
            (0xF, _, 0x1, 0x5) => SetDt(opcode.x()),
            (0xF, _, 0x1, 0x8) => SetSt(opcode.x()),
            (0xF, _, 0x1, 0xE) => AddI(opcode.x()),
            (0xF, _, 0x2, 0x9) => LdFont(opcode.x()),
            (0xF, _, 0x3, 0x3) => LdBcd(opcode.x()),
            (0xF, _, 0x5, 0x5) => StoreRegs(opcode.x()),
            (0xF, _, 0x6, 0x5) => LoadRegs(opcode.x()),
            _ => Unknown(opcode.0),
        }
    }

    /// Execute the instruction against the machine state.
    ///
    /// The program counter has already been advanced past this instruction;
    /// jumps, calls and skips overwrite or extend it from there.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn execute(self, machine: &mut Machine) -> Result<(), Exception> {
        use Instruction::*;

        match self {
            Cls => machine.screen.clear(),

            Ret => {
                let target = machine.pop()?;
                debug!("returning to {:#05X}", target);
                machine.registers.pc = target;
            }

            Jp(target) => machine.registers.pc = target,

            Call(target) => {
                machine.push(machine.registers.pc)?;
                debug!("calling {:#05X}", target);
                machine.registers.pc = target;
            }

            SeByte(x, nn) => {
                if machine.v(x) == nn {
                    machine.skip();
                }
            }

            SneByte(x, nn) => {
                if machine.v(x) != nn {
                    machine.skip();
                }
            }

            SeReg(x, y) => {
                if machine.v(x) == machine.v(y) {
                    machine.skip();
                }
            }

            SneReg(x, y) => {
                if machine.v(x) != machine.v(y) {
                    machine.skip();
                }
            }

            LdByte(x, nn) => *machine.v_mut(x) = nn,

            AddByte(x, nn) => *machine.v_mut(x) = machine.v(x).wrapping_add(nn),

            LdReg(x, y) => *machine.v_mut(x) = machine.v(y),

            Or(x, y) => *machine.v_mut(x) = machine.v(x) | machine.v(y),

            And(x, y) => *machine.v_mut(x) = machine.v(x) & machine.v(y),

            Xor(x, y) => *machine.v_mut(x) = machine.v(x) ^ machine.v(y),

            AddReg(x, y) => {
                let (res, carry) = machine.v(x).overflowing_add(machine.v(y));
                debug!("{} + {} = {} (carry: {})", machine.v(x), machine.v(y), res, carry);
                *machine.v_mut(x) = res;
                machine.registers.set_flag(carry);
            }

            Sub(x, y) => {
                let no_borrow = machine.v(x) >= machine.v(y);
                *machine.v_mut(x) = machine.v(x).wrapping_sub(machine.v(y));
                machine.registers.set_flag(no_borrow);
            }

            Subn(x, y) => {
                let no_borrow = machine.v(y) >= machine.v(x);
                *machine.v_mut(x) = machine.v(y).wrapping_sub(machine.v(x));
                machine.registers.set_flag(no_borrow);
            }

            Shr(x) => {
                // The flag takes the bit shifted out, before the shift
                let low_bit = machine.v(x) & 0x1;
                *machine.v_mut(x) = machine.v(x) >> 1;
                machine.registers.set_flag(low_bit == 1);
            }

            Shl(x) => {
                let high_bit = machine.v(x) >> 7;
                *machine.v_mut(x) = machine.v(x) << 1;
                machine.registers.set_flag(high_bit == 1);
            }

            LdI(address) => machine.registers.i = address,

            JpV0(address) => {
                let target = address.wrapping_add(Address::from(machine.v(0x0)));
                debug!("jumping to {:#05X} (v0 offset)", target);
                machine.registers.pc = target;
            }

            Rnd(x, nn) => *machine.v_mut(x) = rand::random::<u8>() & nn,

            Drw(x, y, n) => {
                let (origin_x, origin_y) = (machine.v(x), machine.v(y));
                let edge = machine.quirks.sprite_edge;
                let rows = machine.memory.slice(machine.registers.i, usize::from(n))?;
                let collision = machine.screen.draw_sprite(origin_x, origin_y, rows, edge);
                debug!(
                    "drew {} rows at ({}, {}), collision: {}",
                    n, origin_x, origin_y, collision
                );
                machine.registers.set_flag(collision);
            }

            Skp(x) => {
                let key = machine.v(x);
                if key > 0xF {
                    return Err(Exception::InvalidKey { key });
                }
                if machine.keypad.is_down(key) {
                    machine.skip();
                    if machine.quirks.key_policy == KeyPolicy::ClearOnConsume {
                        machine.keypad.release(key);
                    }
                }
            }

            Sknp(x) => {
                let key = machine.v(x);
                if key > 0xF {
                    return Err(Exception::InvalidKey { key });
                }
                if !machine.keypad.is_down(key) {
                    machine.skip();
                }
            }

            LdDt(x) => *machine.v_mut(x) = machine.timers.delay,

            LdKey(x) => {
                if let Some(key) = machine.keypad.first_down() {
                    debug!("key {:X} consumed by wait", key);
                    *machine.v_mut(x) = key;
                    if machine.quirks.key_policy == KeyPolicy::ClearOnConsume {
                        machine.keypad.release(key);
                    }
                } else {
                    // Busy-poll: rewind so the next step re-executes the wait
                    machine.registers.pc = machine.registers.pc.wrapping_sub(2);
                }
            }

            SetDt(x) => machine.timers.delay = machine.v(x),

            SetSt(x) => machine.timers.sound = machine.v(x),

            AddI(x) => {
                machine.registers.i = machine.registers.i.wrapping_add(Address::from(machine.v(x)));
                machine.registers.set_flag(machine.registers.i > 0xFFF);
            }

            LdFont(x) => {
                machine.registers.i = FONT_START + Address::from(machine.v(x)) * FONT_GLYPH_SIZE;
            }

            LdBcd(x) => {
                let value = machine.v(x);
                let digits = machine.memory.slice_mut(machine.registers.i, 3)?;
                digits[0] = value / 100;
                digits[1] = (value / 10) % 10;
                digits[2] = value % 10;
            }

            StoreRegs(x) => {
                let count = usize::from(x) + 1;
                let destination = machine.memory.slice_mut(machine.registers.i, count)?;
                destination.copy_from_slice(&machine.registers.v[..count]);
                machine.registers.i = machine.registers.i.wrapping_add(Address::from(x) + 1);
            }

            LoadRegs(x) => {
                let count = usize::from(x) + 1;
                let source = machine.memory.slice(machine.registers.i, count)?;
                machine.registers.v[..count].copy_from_slice(source);
                machine.registers.i = machine.registers.i.wrapping_add(Address::from(x) + 1);
            }

            Unknown(word) => {
                warn!("unknown opcode {:#06X}, skipping", word);
            }
        };

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::quirks::Quirks;
    use super::*;

    fn decode(word: u16) -> Instruction {
        Instruction::decode(Opcode(word))
    }

    #[test]
    fn decode_dispatches_on_nibbles() {
        use Instruction::*;

        assert_eq!(decode(0x00E0), Cls);
        assert_eq!(decode(0x00EE), Ret);
        assert_eq!(decode(0x1ABC), Jp(0xABC));
        assert_eq!(decode(0x2123), Call(0x123));
        assert_eq!(decode(0x3A42), SeByte(0xA, 0x42));
        assert_eq!(decode(0x4A42), SneByte(0xA, 0x42));
        assert_eq!(decode(0x5AB0), SeReg(0xA, 0xB));
        assert_eq!(decode(0x9AB0), SneReg(0xA, 0xB));
        assert_eq!(decode(0x6A42), LdByte(0xA, 0x42));
        assert_eq!(decode(0x7A42), AddByte(0xA, 0x42));
        assert_eq!(decode(0x8AB4), AddReg(0xA, 0xB));
        assert_eq!(decode(0x8AB6), Shr(0xA));
        assert_eq!(decode(0x8ABE), Shl(0xA));
        assert_eq!(decode(0xA123), LdI(0x123));
        assert_eq!(decode(0xB123), JpV0(0x123));
        assert_eq!(decode(0xCA42), Rnd(0xA, 0x42));
        assert_eq!(decode(0xDAB5), Drw(0xA, 0xB, 0x5));
        assert_eq!(decode(0xEA9E), Skp(0xA));
        assert_eq!(decode(0xEAA1), Sknp(0xA));
        assert_eq!(decode(0xFA0A), LdKey(0xA));
        assert_eq!(decode(0xFA33), LdBcd(0xA));
        assert_eq!(decode(0xFA55), StoreRegs(0xA));
        assert_eq!(decode(0xFA65), LoadRegs(0xA));
    }

    #[test]
    fn reserved_encodings_decode_to_unknown() {
        use Instruction::Unknown;

        assert_eq!(decode(0x0000), Unknown(0x0000));
        assert_eq!(decode(0x0123), Unknown(0x0123)); // machine-code call, unsupported
        assert_eq!(decode(0x5AB1), Unknown(0x5AB1));
        assert_eq!(decode(0x8AB8), Unknown(0x8AB8));
        assert_eq!(decode(0xEAFF), Unknown(0xEAFF));
        assert_eq!(decode(0xFA99), Unknown(0xFA99));
    }

    #[test]
    fn mnemonic_listing() {
        let listing: String = [0x6005, 0x6103, 0x8014, 0xD125, 0x1ABC, 0xF329, 0x0123]
            .map(|word| format!("{}\n", decode(word)))
            .concat();
        insta::assert_snapshot!(listing, @r"
        ld   v0, 0x05
        ld   v1, 0x03
        add  v0, v1
        drw  v1, v2, 5
        jp   0xABC
        ld   f, v3
        dw   0x0123
        ");
    }

    #[test]
    fn add_reg_carries_on_overflow() {
        let mut machine = Machine::default();
        machine.registers.v[0x0] = 0xFF;
        machine.registers.v[0x1] = 0x01;
        Instruction::AddReg(0x0, 0x1).execute(&mut machine).unwrap();
        assert_eq!(machine.registers.v[0x0], 0x00);
        assert_eq!(machine.registers.v[0xF], 1);
    }

    #[test]
    fn add_reg_of_zero_is_identity_with_clear_flag() {
        let mut machine = Machine::default();
        machine.registers.v[0x0] = 0x2A;
        machine.registers.v[0xF] = 1; // a stale flag must be overwritten
        Instruction::AddReg(0x0, 0x1).execute(&mut machine).unwrap();
        assert_eq!(machine.registers.v[0x0], 0x2A);
        assert_eq!(machine.registers.v[0xF], 0);
    }

    #[test]
    fn sub_wraps_and_reports_borrow() {
        let mut machine = Machine::default();
        machine.registers.v[0x0] = 0x05;
        machine.registers.v[0x1] = 0x0A;
        Instruction::Sub(0x0, 0x1).execute(&mut machine).unwrap();
        assert_eq!(machine.registers.v[0x0], 0xFB);
        assert_eq!(machine.registers.v[0xF], 0, "borrow clears the flag");
    }

    #[test]
    fn subn_subtracts_the_other_way() {
        let mut machine = Machine::default();
        machine.registers.v[0x0] = 0x05;
        machine.registers.v[0x1] = 0x0A;
        Instruction::Subn(0x0, 0x1).execute(&mut machine).unwrap();
        assert_eq!(machine.registers.v[0x0], 0x05);
        assert_eq!(machine.registers.v[0xF], 1, "no borrow sets the flag");
    }

    #[test]
    fn shifts_capture_the_bit_shifted_out() {
        let mut machine = Machine::default();
        machine.registers.v[0x0] = 0x81;
        Instruction::Shl(0x0).execute(&mut machine).unwrap();
        assert_eq!(machine.registers.v[0x0], 0x02);
        assert_eq!(machine.registers.v[0xF], 1);

        machine.registers.v[0x1] = 0x03;
        Instruction::Shr(0x1).execute(&mut machine).unwrap();
        assert_eq!(machine.registers.v[0x1], 0x01);
        assert_eq!(machine.registers.v[0xF], 1);
    }

    #[test]
    fn bcd_stores_three_decimal_digits() {
        let mut machine = Machine::default();
        machine.registers.v[0x0] = 234;
        machine.registers.i = 0x300;
        Instruction::LdBcd(0x0).execute(&mut machine).unwrap();
        assert_eq!(machine.memory.slice(0x300, 3).unwrap(), &[2, 3, 4]);
    }

    #[test]
    fn register_dump_and_load_advance_the_index() {
        let mut machine = Machine::default();
        machine.registers.v[..4].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        machine.registers.i = 0x300;
        Instruction::StoreRegs(0x3).execute(&mut machine).unwrap();
        assert_eq!(machine.memory.slice(0x300, 4).unwrap(), &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(machine.registers.i, 0x304);

        machine.registers.v = [0; 16];
        machine.registers.i = 0x300;
        Instruction::LoadRegs(0x3).execute(&mut machine).unwrap();
        assert_eq!(&machine.registers.v[..4], &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(machine.registers.v[4], 0, "v4 is untouched");
        assert_eq!(machine.registers.i, 0x304);
    }

    #[test]
    fn rnd_is_masked_by_the_immediate() {
        let mut machine = Machine::default();
        machine.registers.v[0x0] = 0xFF;
        Instruction::Rnd(0x0, 0x00).execute(&mut machine).unwrap();
        assert_eq!(machine.registers.v[0x0], 0x00);

        Instruction::Rnd(0x0, 0x0F).execute(&mut machine).unwrap();
        assert_eq!(machine.registers.v[0x0] & 0xF0, 0x00);
    }

    #[test]
    fn font_pointer_is_five_bytes_per_glyph() {
        let mut machine = Machine::default();
        machine.registers.v[0x4] = 0xA;
        Instruction::LdFont(0x4).execute(&mut machine).unwrap();
        assert_eq!(machine.registers.i, 0xA * 5);
        // The glyph for "A" as baked into memory
        assert_eq!(
            machine.memory.slice(machine.registers.i, 5).unwrap(),
            &[0xF0, 0x90, 0xF0, 0x90, 0x90]
        );
    }

    #[test]
    fn add_i_flags_past_the_address_space() {
        let mut machine = Machine::default();
        machine.registers.i = 0xFFE;
        machine.registers.v[0x0] = 0x05;
        Instruction::AddI(0x0).execute(&mut machine).unwrap();
        assert_eq!(machine.registers.i, 0x1003);
        assert_eq!(machine.registers.v[0xF], 1);
    }

    #[test]
    fn draw_faults_when_the_index_is_out_of_range() {
        let mut machine = Machine::default();
        machine.registers.i = 0xFFE;
        let err = Instruction::Drw(0x0, 0x1, 0x5).execute(&mut machine);
        assert!(matches!(err, Err(Exception::InvalidMemoryAccess(_))));
    }

    #[test]
    fn skip_instructions_reject_out_of_range_keys() {
        let mut machine = Machine::default();
        machine.registers.v[0x0] = 0x10;
        assert_eq!(
            Instruction::Skp(0x0).execute(&mut machine),
            Err(Exception::InvalidKey { key: 0x10 })
        );
    }

    #[test]
    fn skp_consumes_the_key_under_clear_on_consume() {
        let mut machine = Machine::default();
        machine.registers.v[0x0] = 0x7;
        machine.keypad.press(0x7);
        let pc = machine.registers.pc;
        Instruction::Skp(0x0).execute(&mut machine).unwrap();
        assert_eq!(machine.registers.pc, pc + 2);
        assert!(!machine.keypad.is_down(0x7));
    }

    #[test]
    fn skp_leaves_the_key_down_under_persist() {
        let mut machine = Machine::new(Quirks {
            key_policy: KeyPolicy::Persist,
            ..Quirks::default()
        });
        machine.registers.v[0x0] = 0x7;
        machine.keypad.press(0x7);
        Instruction::Skp(0x0).execute(&mut machine).unwrap();
        assert!(machine.keypad.is_down(0x7));
    }
}
