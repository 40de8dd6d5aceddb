//! This module implements the TTY interactive debugger.
//!
//! It is mainly based on two crates:
//!   - rustyline, to handle the line-editing logic
//!   - clap, to handle the parsing of those interactive commands
//!
//! Using Parser to do this is a bit of a hack, and requires some weird options
//! to have it working but works nonetheless.

use clap::Parser;
use rustyline::DefaultEditor;
use tracing::{debug, info, warn};

use chip8_emulator::constants::Address;
use chip8_emulator::runtime::{Instruction, Machine, Opcode, Reg};

static HELP: &str = r#"
Run "help [command]" for command-specific help.
An empty line re-runs the last valid command."#;

#[derive(Parser, Clone, Debug)]
#[clap(
    help_template = "{about}\n\nCOMMANDS:\n{subcommands}\n{after-help}",
    after_help = HELP,
    disable_version_flag = true,
    infer_subcommands = true,
    no_binary_name = true,
)]
/// Interactive mode commands
enum Command {
    /// Execute the next instructions
    #[command(alias = "s")]
    Step {
        /// Number of steps to execute
        #[clap(value_parser, default_value = "1")]
        number: u64,
    },

    /// Advance the 60 Hz timers
    Tick {
        /// Number of timer ticks
        #[clap(value_parser, default_value = "1")]
        number: u64,
    },

    /// Show the state of registers
    Registers {
        #[clap(value_parser)]
        register: Option<Reg>,
    },

    /// Show the content of a block in memory
    Memory {
        /// The address to show, decimal or 0x-prefixed hexadecimal
        #[clap(value_parser = parse_address)]
        address: Address,

        /// Number of bytes to show
        #[clap(value_parser, default_value = "16")]
        number: u16,
    },

    /// Render the framebuffer
    Screen,

    /// Show the next few instructions
    List {
        /// Number of instructions to show
        #[clap(value_parser, default_value = "10")]
        number: u16,
    },

    /// Press a key (0-f)
    KeyDown {
        #[clap(value_parser = parse_key)]
        key: u8,
    },

    /// Release a key (0-f)
    KeyUp {
        #[clap(value_parser = parse_key)]
        key: u8,
    },

    /// Reset the machine to power-on state
    Reset,

    /// Exit the emulator
    Exit,
}

fn parse_address(s: &str) -> Result<Address, std::num::ParseIntError> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Address::from_str_radix(hex, 16)
    } else {
        s.parse()
    }
}

/// Address of the `offset`-th instruction after the program counter,
/// saturating at the end of the address range
fn list_address(pc: Address, offset: u16) -> Address {
    pc.saturating_add(offset.saturating_mul(2))
}

fn parse_key(s: &str) -> Result<u8, String> {
    u8::from_str_radix(s, 16)
        .ok()
        .filter(|key| *key < 16)
        .ok_or_else(|| format!("expected a key in 0-f, got \"{s}\""))
}

/// Display an instruction with a gutter marker on the current line
fn display_instruction(machine: &Machine, address: Address) {
    let gutter = if machine.registers.pc == address {
        ">"
    } else {
        " "
    };

    match machine.memory.read_word(address) {
        Ok(word) => info!(
            "{} {:#05X}  {:04X}  {}",
            gutter,
            address,
            word,
            Instruction::decode(Opcode(word))
        ),
        Err(_) => info!("{} {:#05X}  –", gutter, address),
    }
}

fn display_memory(machine: &Machine, address: Address, number: u16) {
    use std::fmt::Write;

    for row_start in (address..address.saturating_add(number)).step_by(8) {
        let mut line = String::new();
        for offset in 0..8.min(address.saturating_add(number) - row_start) {
            match machine.memory.get(row_start + offset) {
                Ok(byte) => {
                    let _ = write!(line, " {byte:02X}");
                }
                Err(_) => {
                    let _ = write!(line, " ??");
                }
            }
        }
        info!("{:#05X} {}", row_start, line);
    }
}

#[allow(clippy::too_many_lines)]
pub(crate) fn run_interactive(machine: &mut Machine) {
    info!("Running in interactive mode. Type \"help\" to list available commands.");

    let Ok(mut rl) = DefaultEditor::new() else {
        warn!("Could not initialize terminal input");
        return;
    };

    let mut last_command: Option<Command> = None;

    'read: loop {
        let Ok(readline) = rl.readline(">> ") else {
            info!("EOF, exiting");
            return;
        };

        let command = if readline.is_empty() {
            if let Some(command) = &last_command {
                command.clone()
            } else {
                info!("Type \"help\" to get the list of available commands");
                continue 'read;
            }
        } else {
            let _ = rl.add_history_entry(&readline);

            let Ok(words) = shell_words::split(readline.as_str()) else {
                warn!("Invalid input");
                continue 'read;
            };

            let command = match Command::try_parse_from(words) {
                Ok(command) => command,
                Err(e) => {
                    // The error rendering includes the usage/help text
                    println!("{e}");
                    continue 'read;
                }
            };
            last_command = Some(command.clone());
            command
        };

        debug!("Executing command: {:?}", command);

        match command {
            Command::Exit => break,

            Command::Step { number } => {
                for _ in 0..number {
                    if let Err(e) = machine.step() {
                        warn!(error = &e as &dyn std::error::Error, "fault");
                        continue 'read;
                    }
                }
                display_instruction(machine, machine.registers.pc);
            }

            Command::Tick { number } => {
                for _ in 0..number {
                    if machine.tick_timers() {
                        info!("beep");
                    }
                }
            }

            Command::Registers { register } => {
                if let Some(reg) = register {
                    info!("{} = {:#06X}", reg, machine.register(reg));
                } else {
                    info!("{}", machine.registers);
                    info!(
                        "dt = {} | st = {} | stack depth = {} | cycles = {}",
                        machine.timers.delay,
                        machine.timers.sound,
                        machine.stack_depth(),
                        machine.cycles
                    );
                }
            }

            Command::Memory { address, number } => display_memory(machine, address, number),

            Command::Screen => println!("{}", machine.framebuffer()),

            Command::List { number } => {
                for offset in 0..number {
                    display_instruction(machine, list_address(machine.registers.pc, offset));
                }
            }

            Command::KeyDown { key } => machine.key_down(key),

            Command::KeyUp { key } => machine.key_up(key),

            Command::Reset => machine.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_addresses_saturate_instead_of_wrapping() {
        assert_eq!(list_address(0x200, 1), 0x202);
        // A huge count must not wrap the address space
        assert_eq!(list_address(0x200, 40_000), u16::MAX);
        assert_eq!(list_address(0x200, u16::MAX), u16::MAX);
    }

    #[test]
    fn addresses_parse_in_decimal_and_hexadecimal() {
        assert_eq!(parse_address("512").unwrap(), 0x200);
        assert_eq!(parse_address("0x200").unwrap(), 0x200);
        assert_eq!(parse_address("0X2A").unwrap(), 0x2A);
        assert!(parse_address("twelve").is_err());
    }

    #[test]
    fn keys_parse_as_single_hex_digits() {
        assert_eq!(parse_key("a").unwrap(), 0xA);
        assert_eq!(parse_key("0").unwrap(), 0x0);
        assert!(parse_key("10").is_err());
        assert!(parse_key("g").is_err());
    }
}
