use bitflags::bitflags;

bitflags! {
    /// Pressed state of the sixteen keys, one bit per key index.
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct Keys: u16 {
        const K0 = 1 << 0x0;
        const K1 = 1 << 0x1;
        const K2 = 1 << 0x2;
        const K3 = 1 << 0x3;
        const K4 = 1 << 0x4;
        const K5 = 1 << 0x5;
        const K6 = 1 << 0x6;
        const K7 = 1 << 0x7;
        const K8 = 1 << 0x8;
        const K9 = 1 << 0x9;
        const KA = 1 << 0xA;
        const KB = 1 << 0xB;
        const KC = 1 << 0xC;
        const KD = 1 << 0xD;
        const KE = 1 << 0xE;
        const KF = 1 << 0xF;
    }
}

impl std::fmt::Debug for Keys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018b}", self.bits())
    }
}

/// The sixteen-key hexadecimal keypad.
///
/// The host maps physical keys to logical indices 0x0–0xF and reports edges
/// through [`Keypad::press`] and [`Keypad::release`]; the machine never polls
/// hardware itself.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keypad {
    keys: Keys,
}

impl Keypad {
    fn mask(key: u8) -> Keys {
        Keys::from_bits_truncate(1 << (key & 0xF))
    }

    /// Mark a key as pressed. Key indices are taken modulo 16.
    pub fn press(&mut self, key: u8) {
        self.keys.insert(Self::mask(key));
    }

    /// Mark a key as released
    pub fn release(&mut self, key: u8) {
        self.keys.remove(Self::mask(key));
    }

    /// Whether a key is currently pressed
    #[must_use]
    pub fn is_down(&self, key: u8) -> bool {
        self.keys.contains(Self::mask(key))
    }

    /// The lowest-numbered pressed key, if any
    #[must_use]
    pub fn first_down(&self) -> Option<u8> {
        if self.keys.is_empty() {
            None
        } else {
            Some(self.keys.bits().trailing_zeros() as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut keypad = Keypad::default();
        assert!(!keypad.is_down(0xA));
        keypad.press(0xA);
        assert!(keypad.is_down(0xA));
        keypad.release(0xA);
        assert!(!keypad.is_down(0xA));
    }

    #[test]
    fn first_down_picks_the_lowest_key() {
        let mut keypad = Keypad::default();
        assert_eq!(keypad.first_down(), None);
        keypad.press(0xC);
        keypad.press(0x3);
        assert_eq!(keypad.first_down(), Some(0x3));
    }
}
