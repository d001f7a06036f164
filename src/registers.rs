use crate::error::Chip8Error;
use crate::memory::TypeAddr;

pub const NUM_V_REGISTERS: usize = 16;
pub const FLAG_REGISTER: u8 = 0xF;

/// A single unsigned cell that is `BITS` wide.
///
/// Values that do not fit are refused rather than truncated. Instructions that
/// want wraparound mask their results before calling `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Register<const BITS: u32>(u16);

impl<const BITS: u32> Register<BITS> {
    pub const MAX: u16 = ((1u32 << BITS) - 1) as u16;

    pub fn new() -> Self {
        Self(0)
    }

    pub fn get(&self) -> u16 {
        self.0
    }

    pub fn set(&mut self, value: u16) -> Result<(), Chip8Error> {
        if value > Self::MAX {
            return Err(Chip8Error::RegisterOverflow { value, bits: BITS });
        }
        self.0 = value;
        Ok(())
    }
}

pub type ByteRegister = Register<8>;
// 12 bits is enough for the whole 4K address space
pub type IndexRegister = Register<12>;
pub type ProgramCounter = Register<16>;

#[derive(Debug, Clone)]
pub struct Registers {
    registers: [ByteRegister; NUM_V_REGISTERS],
    pub index: IndexRegister,
    pub pc: ProgramCounter,
    pub delay_timer: ByteRegister,
    pub sound_timer: ByteRegister,
}

impl Registers {
    pub fn new() -> Self {
        Self {
            registers: [ByteRegister::new(); NUM_V_REGISTERS],
            index: IndexRegister::new(),
            pc: ProgramCounter::new(),
            delay_timer: ByteRegister::new(),
            sound_timer: ByteRegister::new(),
        }
    }

    pub fn get(&self, reg_num: u8) -> Result<u8, Chip8Error> {
        self.registers
            .get(reg_num as usize)
            .map(|reg| reg.get() as u8)
            .ok_or(Chip8Error::RegisterOutOfRange { register: reg_num })
    }

    pub fn set_register(&mut self, reg_num: u8, value: u16) -> Result<(), Chip8Error> {
        self.registers
            .get_mut(reg_num as usize)
            .ok_or(Chip8Error::RegisterOutOfRange { register: reg_num })?
            .set(value)
    }

    pub fn set_flag(&mut self, on: bool) -> Result<(), Chip8Error> {
        self.set_register(FLAG_REGISTER, on as u16)
    }

    pub fn index(&self) -> TypeAddr {
        self.index.get()
    }

    pub fn set_index(&mut self, addr: u16) -> Result<(), Chip8Error> {
        self.index.set(addr)
    }

    pub fn pc(&self) -> TypeAddr {
        self.pc.get()
    }

    pub fn set_pc(&mut self, addr: u16) -> Result<(), Chip8Error> {
        self.pc.set(addr)
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer.get() as u8
    }

    pub fn set_delay_timer(&mut self, value: u8) {
        self.delay_timer = Register(value as u16);
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer.get() as u8
    }

    pub fn set_sound_timer(&mut self, value: u8) {
        self.sound_timer = Register(value as u16);
    }

    /// Knock `periods` ticks off both timers, stopping at zero.
    pub fn decay_timers(&mut self, periods: u32) {
        let periods = periods.min(u8::MAX as u32) as u8;
        self.set_delay_timer(self.delay_timer().saturating_sub(periods));
        self.set_sound_timer(self.sound_timer().saturating_sub(periods));
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_rejects_wide_values() {
        let mut reg = ByteRegister::new();
        assert!(reg.set(0xFF).is_ok());
        assert_eq!(
            reg.set(300),
            Err(Chip8Error::RegisterOverflow { value: 300, bits: 8 })
        );
        // the old value survives a refused write
        assert_eq!(reg.get(), 0xFF);
    }

    #[test]
    fn test_register_widths() {
        assert_eq!(ByteRegister::MAX, 0xFF);
        assert_eq!(IndexRegister::MAX, 0xFFF);
        assert_eq!(ProgramCounter::MAX, 0xFFFF);

        let mut i = IndexRegister::new();
        assert!(i.set(0xFFF).is_ok());
        assert!(i.set(0x1000).is_err());
    }

    #[test]
    fn test_register_number_checked() {
        let mut regs = Registers::new();
        assert!(regs.set_register(0xF, 1).is_ok());
        assert_eq!(regs.get(0xF), Ok(1));
        assert_eq!(
            regs.get(0x10),
            Err(Chip8Error::RegisterOutOfRange { register: 0x10 })
        );
        assert_eq!(
            regs.set_register(0x10, 1),
            Err(Chip8Error::RegisterOutOfRange { register: 0x10 })
        );
    }

    #[test]
    fn test_timers_clamp_at_zero() {
        let mut regs = Registers::new();
        regs.set_delay_timer(3);
        regs.set_sound_timer(10);
        regs.decay_timers(5);
        assert_eq!(regs.delay_timer(), 0);
        assert_eq!(regs.sound_timer(), 5);
        regs.decay_timers(1000);
        assert_eq!(regs.sound_timer(), 0);
    }
}
