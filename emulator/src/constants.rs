/// Memory address type. Only the low 12 bits (0x000–0xFFF) are addressable.
pub type Address = u16;

/// Total size of the machine memory in bytes
pub const MEMORY_SIZE: usize = 4096;

/// Address where program images are loaded
pub const PROGRAM_START: Address = 0x200;

/// Address of the built-in hexadecimal font
pub const FONT_START: Address = 0x000;

/// Size of one font glyph in bytes
pub const FONT_GLYPH_SIZE: Address = 5;

/// Maximum call stack depth
pub const STACK_DEPTH: usize = 16;

/// Width of the display in pixels
pub const DISPLAY_WIDTH: usize = 64;

/// Height of the display in pixels
pub const DISPLAY_HEIGHT: usize = 32;

/// Rate at which the host should call `tick_timers`, in Hz
pub const TIMER_RATE: u32 = 60;
