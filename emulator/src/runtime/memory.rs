use thiserror::Error;

use crate::constants::{Address, FONT_START, MEMORY_SIZE, PROGRAM_START};

/// Built-in hexadecimal font: 16 glyphs of 5 bytes each, one bit per pixel,
/// drawn 4 pixels wide. Copied into memory at [`FONT_START`] on reset.
pub(crate) const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Represents errors related to memory manipulations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// The address falls outside the 4 KiB address space. Programs never get
    /// a silently wrapped access.
    #[error("address {address:#05X} is outside addressable memory")]
    OutOfBounds { address: Address },

    /// The program image does not fit between [`PROGRAM_START`] and the end
    /// of memory.
    #[error("program image of {len} bytes does not fit in {capacity} bytes")]
    ProgramTooLarge { len: usize, capacity: usize },
}

/// Holds the 4096 bytes of machine memory.
///
/// A freshly created `Memory` is zeroed except for the font area.
#[derive(Clone)]
pub struct Memory {
    inner: Box<[u8; MEMORY_SIZE]>,
}

impl Default for Memory {
    fn default() -> Self {
        let mut memory = Self {
            inner: Box::new([0; MEMORY_SIZE]),
        };
        let start = usize::from(FONT_START);
        memory.inner[start..start + FONT.len()].copy_from_slice(&FONT);
        memory
    }
}

impl Memory {
    /// Get the byte at an address
    ///
    /// # Errors
    ///
    /// It fails if the address is out of bounds.
    pub fn get(&self, address: Address) -> Result<u8, MemoryError> {
        self.inner
            .get(usize::from(address))
            .copied()
            .ok_or(MemoryError::OutOfBounds { address })
    }

    /// Get a mutable reference to the byte at an address
    ///
    /// # Errors
    ///
    /// It fails if the address is out of bounds.
    pub fn get_mut(&mut self, address: Address) -> Result<&mut u8, MemoryError> {
        self.inner
            .get_mut(usize::from(address))
            .ok_or(MemoryError::OutOfBounds { address })
    }

    /// Fetch the big-endian 16-bit word at [address, address + 1]
    ///
    /// # Errors
    ///
    /// It fails if either byte is out of bounds.
    pub fn read_word(&self, address: Address) -> Result<u16, MemoryError> {
        let high = self.get(address)?;
        let low = self.get(address + 1)?;
        Ok(u16::from(high) << 8 | u16::from(low))
    }

    /// Borrow `len` bytes starting at an address
    ///
    /// # Errors
    ///
    /// It fails if any byte of the range is out of bounds.
    pub fn slice(&self, address: Address, len: usize) -> Result<&[u8], MemoryError> {
        let start = usize::from(address);
        let end = start + len;
        self.inner
            .get(start..end)
            .ok_or(MemoryError::OutOfBounds { address })
    }

    /// Mutably borrow `len` bytes starting at an address
    ///
    /// # Errors
    ///
    /// It fails if any byte of the range is out of bounds.
    pub fn slice_mut(&mut self, address: Address, len: usize) -> Result<&mut [u8], MemoryError> {
        let start = usize::from(address);
        let end = start + len;
        self.inner
            .get_mut(start..end)
            .ok_or(MemoryError::OutOfBounds { address })
    }

    /// Copy a raw program image at [`PROGRAM_START`]
    ///
    /// The image is not validated in any way; malformed opcodes are a runtime
    /// concern, not a load-time one.
    ///
    /// # Errors
    ///
    /// It fails if the image does not fit in memory.
    pub fn load_program(&mut self, image: &[u8]) -> Result<(), MemoryError> {
        let capacity = MEMORY_SIZE - usize::from(PROGRAM_START);
        if image.len() > capacity {
            return Err(MemoryError::ProgramTooLarge {
                len: image.len(),
                capacity,
            });
        }

        let start = usize::from(PROGRAM_START);
        self.inner[start..start + image.len()].copy_from_slice(image);
        Ok(())
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Memory {{ [...] }}")
    }
}
