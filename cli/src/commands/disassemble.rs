use camino::Utf8PathBuf;
use clap::{Parser, ValueHint};
use tracing::info;

use chip8_emulator::constants::PROGRAM_START;
use chip8_emulator::runtime::{Instruction, Opcode};

#[derive(Parser, Debug)]
pub struct DisassembleOpt {
    /// ROM file
    #[clap(value_parser, value_hint = ValueHint::FilePath)]
    input: Utf8PathBuf,
}

impl DisassembleOpt {
    pub fn exec(&self) -> anyhow::Result<()> {
        info!(path = %self.input, "reading ROM");
        let image = std::fs::read(&self.input)?;

        print!("{}", listing(&image));
        Ok(())
    }
}

/// Decode an image two bytes at a time, as it would execute from 0x200.
///
/// A trailing odd byte is rendered as data.
fn listing(image: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let mut chunks = image.chunks_exact(2);
    for (offset, chunk) in chunks.by_ref().enumerate() {
        let address = usize::from(PROGRAM_START) + offset * 2;
        let word = u16::from(chunk[0]) << 8 | u16::from(chunk[1]);
        let instruction = Instruction::decode(Opcode(word));
        let _ = writeln!(out, "{address:#05X}  {word:04X}  {instruction}");
    }
    if let [byte] = chunks.remainder() {
        let address = usize::from(PROGRAM_START) + image.len() - 1;
        let _ = writeln!(out, "{address:#05X}  {byte:02X}    db   {byte:#04X}");
    }
    out
}
