/// The delay and sound timers.
///
/// Both decrement toward zero at a fixed 60 Hz, driven exclusively by the
/// host through [`Timers::tick`], never by instruction execution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timers {
    /// Delay timer, readable and writable by programs
    pub delay: u8,

    /// Sound timer; the machine beeps while it is non-zero
    pub sound: u8,
}

impl Timers {
    /// Decrement both timers by one 60 Hz tick.
    ///
    /// Returns `true` exactly when the sound timer transitions from 1 to 0,
    /// which is the single audible-tick event the host should map to a beep.
    pub fn tick(&mut self) -> bool {
        if self.delay > 0 {
            self.delay -= 1;
        }

        if self.sound > 0 {
            self.sound -= 1;
            self.sound == 0
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_decay_monotonically_to_zero() {
        let mut timers = Timers { delay: 60, sound: 0 };
        for expected in (0..60).rev() {
            timers.tick();
            assert_eq!(timers.delay, expected);
        }
        timers.tick();
        assert_eq!(timers.delay, 0, "timers never go below zero");
    }

    #[test]
    fn sound_event_fires_once_on_the_one_to_zero_transition() {
        let mut timers = Timers { delay: 0, sound: 3 };
        assert!(!timers.tick()); // 3 -> 2
        assert!(!timers.tick()); // 2 -> 1
        assert!(timers.tick()); // 1 -> 0, beep
        assert!(!timers.tick()); // stays at 0, no repeat
    }
}
