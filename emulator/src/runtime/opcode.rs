/// A raw 16-bit instruction word.
///
/// The top nibble selects the instruction family; depending on the family the
/// remaining nibbles carry register indices (`x`, `y`), a 4-bit immediate
/// (`n`), an 8-bit immediate (`nn`) or a 12-bit address (`nnn`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    /// The word split into its four nibbles, most significant first
    #[must_use]
    pub fn nibbles(self) -> (u8, u8, u8, u8) {
        (
            ((self.0 & 0xF000) >> 12) as u8,
            self.x(),
            self.y(),
            self.n(),
        )
    }

    /// Bits 8–11, the `vX` operand
    #[must_use]
    pub fn x(self) -> u8 {
        ((self.0 & 0x0F00) >> 8) as u8
    }

    /// Bits 4–7, the `vY` operand
    #[must_use]
    pub fn y(self) -> u8 {
        ((self.0 & 0x00F0) >> 4) as u8
    }

    /// Bits 0–3, the 4-bit immediate
    #[must_use]
    pub fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    /// The low byte, the 8-bit immediate
    #[must_use]
    pub fn nn(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// The low 12 bits, an address
    #[must_use]
    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }
}

impl From<u16> for Opcode {
    fn from(word: u16) -> Self {
        Self(word)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nibbles() {
        assert_eq!(Opcode(0xABCD).nibbles(), (0xA, 0xB, 0xC, 0xD));
    }

    #[test]
    fn operands() {
        let op = Opcode(0xABCD);
        assert_eq!(op.x(), 0xB);
        assert_eq!(op.y(), 0xC);
        assert_eq!(op.n(), 0xD);
        assert_eq!(op.nn(), 0xCD);
        assert_eq!(op.nnn(), 0xBCD);
    }

    #[test]
    fn display_is_the_raw_word() {
        assert_eq!(Opcode(0x00E0).to_string(), "00E0");
    }
}
