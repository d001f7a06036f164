/// Everything that can stop the machine.
///
/// None of these are retried. An instruction that fails ends the current run,
/// the same way a fault would on real hardware.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Chip8Error {
    #[error("illegal opcode {opcode:#06X}")]
    IllegalOpcode { opcode: u16 },

    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("register V{register:X} does not exist")]
    RegisterOutOfRange { register: u8 },

    #[error("value {value:#X} cannot be stored using {bits} bits")]
    RegisterOverflow { value: u16, bits: u32 },

    #[error("call stack is full")]
    StackFull,

    #[error("return with an empty call stack")]
    StackEmpty,

    #[error("no program loaded")]
    NoProgramLoaded,

    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("key {key:#X} is outside the keypad")]
    InvalidKey { key: u8 },
}
