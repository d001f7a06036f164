use crate::error::Chip8Error;

pub type TypeAddr = u16; // in reality u12
type FontBytes = [u8; 5 * 16];

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: TypeAddr = 0x200;
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const FONT_START: TypeAddr = 0x50;
pub const FONT_GLYPH_SIZE: u16 = 5;
pub const STACK_SIZE: usize = 16;

const DEFAULT_FONT: FontBytes = [
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

#[derive(Clone)]
struct Font {
    data: FontBytes,
}

impl Default for Font {
    fn default() -> Self {
        Self { data: DEFAULT_FONT }
    }
}

/// Address of the built-in glyph for hex digit `digit` (only the low nibble counts).
pub fn glyph_addr(digit: u8) -> TypeAddr {
    FONT_START + (digit & 0xF) as u16 * FONT_GLYPH_SIZE
}

#[derive(Clone)]
pub struct Memory {
    // 4k bytes
    // font data stored from 050 -> 09F (000 -> 04F is empty by convention)
    bytes: [u8; MEMORY_SIZE],
    font: Font,
    pub stack: Stack,
}

impl Memory {
    pub fn new() -> Self {
        let mut mem = Self {
            bytes: [0; MEMORY_SIZE],
            stack: Stack::new(),
            font: Font::default(),
        };
        mem.load_font();
        mem
    }

    pub fn set(&mut self, addr: TypeAddr, val: u8) -> Result<(), Chip8Error> {
        let cell = self
            .bytes
            .get_mut(addr as usize)
            .ok_or(Chip8Error::MemoryOutOfBounds {
                address: addr as usize,
            })?;
        *cell = val;
        Ok(())
    }

    pub fn get(&self, addr: TypeAddr) -> Result<u8, Chip8Error> {
        self.bytes
            .get(addr as usize)
            .copied()
            .ok_or(Chip8Error::MemoryOutOfBounds {
                address: addr as usize,
            })
    }

    /// Reads `len` bytes starting at `addr`, failing if any of them falls off the end.
    pub fn slice(&self, addr: TypeAddr, len: usize) -> Result<&[u8], Chip8Error> {
        let start = addr as usize;
        self.bytes
            .get(start..start + len)
            .ok_or(Chip8Error::MemoryOutOfBounds {
                address: start.max(MEMORY_SIZE),
            })
    }

    /// Two bytes at `addr`, big-endian.
    pub fn read_word(&self, addr: TypeAddr) -> Result<u16, Chip8Error> {
        let l = self.get(addr)?;
        let r = self.get(addr.wrapping_add(1))?;
        Ok(((l as u16) << 8) | r as u16)
    }

    /// Wipes memory and the stack, reloads the font and copies `bytes` to 0x200.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), Chip8Error> {
        if bytes.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: bytes.len(),
                max_size: MAX_PROGRAM_SIZE,
            });
        }

        self.bytes = [0; MEMORY_SIZE];
        self.stack = Stack::new();
        self.load_font();

        let start_index = PROGRAM_START as usize;
        self.bytes[start_index..start_index + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn load_font(&mut self) {
        let start_index = FONT_START as usize;
        self.bytes[start_index..start_index + self.font.data.len()]
            .copy_from_slice(&self.font.data);
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// Return addresses for CALL/RET, at most `STACK_SIZE` deep.
#[derive(Debug, Clone)]
pub struct Stack {
    addresses: [TypeAddr; STACK_SIZE],
    sp: usize,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            addresses: [0; STACK_SIZE],
            sp: 0,
        }
    }

    pub fn push(&mut self, addr: TypeAddr) -> Result<(), Chip8Error> {
        if self.sp == STACK_SIZE {
            return Err(Chip8Error::StackFull);
        }
        self.addresses[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<TypeAddr, Chip8Error> {
        if self.sp == 0 {
            return Err(Chip8Error::StackEmpty);
        }
        self.sp -= 1;
        Ok(self.addresses[self.sp])
    }

    pub fn len(&self) -> usize {
        self.sp
    }

    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_loaded_at_base() {
        let mem = Memory::new();
        assert_eq!(mem.slice(FONT_START, 5).unwrap(), &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(glyph_addr(0xF), 0x50 + 75);
        assert_eq!(glyph_addr(0x1F), glyph_addr(0xF));
    }

    #[test]
    fn test_bounds_checked() {
        let mut mem = Memory::new();
        assert!(mem.set(0xFFF, 0xAB).is_ok());
        assert_eq!(mem.get(0xFFF), Ok(0xAB));
        assert_eq!(
            mem.get(0x1000),
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 })
        );
        assert_eq!(
            mem.set(0x1000, 1),
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 })
        );
        assert!(mem.slice(0xFFE, 2).is_ok());
        assert!(mem.slice(0xFFE, 3).is_err());
    }

    #[test]
    fn test_read_word_big_endian() {
        let mut mem = Memory::new();
        mem.load_rom(&[0xAA, 0xBB]).unwrap();
        assert_eq!(mem.read_word(PROGRAM_START), Ok(0xAABB));
        assert!(mem.read_word(0xFFF).is_err());
    }

    #[test]
    fn test_load_rom_resets_memory() {
        let mut mem = Memory::new();
        mem.set(0x300, 0x12).unwrap();
        mem.stack.push(0x204).unwrap();
        mem.load_rom(&[0x00, 0xE0]).unwrap();
        assert_eq!(mem.get(0x300), Ok(0));
        assert!(mem.stack.is_empty());
        assert_eq!(mem.slice(PROGRAM_START, 2).unwrap(), &[0x00, 0xE0]);
        assert_eq!(mem.get(FONT_START), Ok(0xF0));
    }

    #[test]
    fn test_rom_too_large() {
        let mut mem = Memory::new();
        let rom = vec![0; MAX_PROGRAM_SIZE + 1];
        assert_eq!(
            mem.load_rom(&rom),
            Err(Chip8Error::RomTooLarge {
                size: MAX_PROGRAM_SIZE + 1,
                max_size: MAX_PROGRAM_SIZE
            })
        );
        assert!(mem.load_rom(&rom[1..]).is_ok());
    }

    #[test]
    fn test_stack_bounds() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(), Err(Chip8Error::StackEmpty));
        for addr in 0..STACK_SIZE as u16 {
            stack.push(addr).unwrap();
        }
        assert_eq!(stack.push(0x999), Err(Chip8Error::StackFull));
        assert_eq!(stack.len(), STACK_SIZE);
        assert_eq!(stack.pop(), Ok(15));
    }
}
