use std::time::Instant;

use log::{debug, trace, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::Config,
    decode::{OpCodes, INSTRUCTION_SIZE},
    display::{paint, FrameBuffer, Screen},
    error::Chip8Error,
    keyboard::Keypad,
    memory::{glyph_addr, Memory, TypeAddr, PROGRAM_START},
    registers::Registers,
    timer::Timer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing loaded yet.
    Idle,
    Running,
    Paused,
    /// Stopped on `LD Vx, K` until the keypad reports a press.
    AwaitingKey,
    /// Ran off the end of the program or hit a fatal error.
    Halted,
}

/// What an executed instruction wants done with the program counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcUpdate {
    Next,
    Skip,
    Jump(TypeAddr),
    /// Leave PC where it is and wait for a key.
    Hold,
}

impl PcUpdate {
    fn skip_if(condition: bool) -> Self {
        if condition {
            PcUpdate::Skip
        } else {
            PcUpdate::Next
        }
    }
}

/// Outcome of one controller step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    Executed(OpCodes),
    KeyReceived { register: u8, key: u8 },
    AwaitingKey,
    Paused,
    Halted,
}

pub struct Emulator {
    pub fb: FrameBuffer,
    pub regs: Registers,
    pub mem: Memory,
    pub keypad: Keypad,
    rng: StdRng,
    timer: Timer,
    state: RunState,
    // state to go back to when unpaused
    resume_to: RunState,
    program_len: Option<usize>,
    fault: Option<Chip8Error>,
}

impl Emulator {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            fb: FrameBuffer::new(),
            regs: Registers::new(),
            mem: Memory::new(),
            keypad: Keypad::new(),
            rng,
            timer: Timer::new(),
            state: RunState::Idle,
            resume_to: RunState::Running,
            program_len: None,
            fault: None,
        }
    }

    /// Resets the machine and copies `program` to 0x200.
    ///
    /// On error the machine is left exactly as it was.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        self.mem.load_rom(program)?;
        self.regs = Registers::new();
        self.regs.set_pc(PROGRAM_START)?;
        self.fb.clear();
        self.keypad.cancel_wait();
        self.timer.reset();
        self.program_len = Some(program.len());
        self.fault = None;
        self.resume_to = RunState::Running;
        debug!(
            "loaded {} byte program at {:#05X}",
            program.len(),
            PROGRAM_START
        );
        self.set_state(RunState::Running);
        Ok(())
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// The error that halted the machine, if any.
    pub fn fault(&self) -> Option<&Chip8Error> {
        self.fault.as_ref()
    }

    fn set_state(&mut self, state: RunState) {
        if self.state != state {
            debug!("{:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    /// Whether PC still points inside the loaded program.
    pub fn has_more_instructions(&self) -> Result<bool, Chip8Error> {
        let len = self.program_len.ok_or(Chip8Error::NoProgramLoaded)?;
        let start = PROGRAM_START as usize;
        let pc = self.regs.pc() as usize;
        Ok(pc >= start && pc < start + len)
    }

    pub fn fetch_decode(&self) -> Result<OpCodes, Chip8Error> {
        let ins = self.mem.read_word(self.regs.pc())?;
        OpCodes::decode_raw(ins)
    }

    fn write_with_flag(&mut self, vx: u8, value: u8, flag: bool) -> Result<(), Chip8Error> {
        // VF last, so it keeps the flag when vx is VF
        self.regs.set_register(vx, value as u16)?;
        self.regs.set_flag(flag)
    }

    pub fn execute_ins(&mut self, ins: OpCodes) -> Result<PcUpdate, Chip8Error> {
        let update = match ins {
            OpCodes::Sys(_) => PcUpdate::Next,
            OpCodes::ClearScreen => {
                self.fb.clear();
                PcUpdate::Next
            }
            OpCodes::PopSubroutine => PcUpdate::Jump(self.mem.stack.pop()?),
            OpCodes::Jump(addr) => PcUpdate::Jump(addr),
            OpCodes::PushSubroutine(addr) => {
                // return address, the instruction after this one
                self.mem.stack.push(self.regs.pc() + INSTRUCTION_SIZE)?;
                PcUpdate::Jump(addr)
            }
            OpCodes::SkipEqualConstant(vx, kk) => PcUpdate::skip_if(self.regs.get(vx)? == kk),
            OpCodes::SkipNotEqualConstant(vx, kk) => PcUpdate::skip_if(self.regs.get(vx)? != kk),
            OpCodes::SkipEqualRegister(vx, vy) => {
                PcUpdate::skip_if(self.regs.get(vx)? == self.regs.get(vy)?)
            }
            OpCodes::SkipNotEqualRegister(vx, vy) => {
                PcUpdate::skip_if(self.regs.get(vx)? != self.regs.get(vy)?)
            }
            OpCodes::SetRegister(vx, kk) => {
                self.regs.set_register(vx, kk as u16)?;
                PcUpdate::Next
            }
            OpCodes::AddToRegister(vx, kk) => {
                let value = self.regs.get(vx)?.wrapping_add(kk);
                self.regs.set_register(vx, value as u16)?;
                PcUpdate::Next
            }
            OpCodes::CopyRegister(vx, vy) => {
                self.regs.set_register(vx, self.regs.get(vy)? as u16)?;
                PcUpdate::Next
            }
            OpCodes::Or(vx, vy) => {
                let value = self.regs.get(vx)? | self.regs.get(vy)?;
                self.regs.set_register(vx, value as u16)?;
                PcUpdate::Next
            }
            OpCodes::And(vx, vy) => {
                let value = self.regs.get(vx)? & self.regs.get(vy)?;
                self.regs.set_register(vx, value as u16)?;
                PcUpdate::Next
            }
            OpCodes::XOr(vx, vy) => {
                let value = self.regs.get(vx)? ^ self.regs.get(vy)?;
                self.regs.set_register(vx, value as u16)?;
                PcUpdate::Next
            }
            OpCodes::Add(vx, vy) => {
                let (sum, carry) = self.regs.get(vx)?.overflowing_add(self.regs.get(vy)?);
                self.write_with_flag(vx, sum, carry)?;
                PcUpdate::Next
            }
            OpCodes::SubtractForward(vx, vy) => {
                let (x, y) = (self.regs.get(vx)?, self.regs.get(vy)?);
                self.write_with_flag(vx, x.wrapping_sub(y), x > y)?;
                PcUpdate::Next
            }
            OpCodes::SubtractBackward(vx, vy) => {
                let (x, y) = (self.regs.get(vx)?, self.regs.get(vy)?);
                self.write_with_flag(vx, y.wrapping_sub(x), y > x)?;
                PcUpdate::Next
            }
            OpCodes::RightShift(vx, vy) => {
                let source = self.regs.get(vy)?;
                self.write_with_flag(vx, source >> 1, source & 1 == 1)?;
                PcUpdate::Next
            }
            OpCodes::LeftShift(vx, vy) => {
                let source = self.regs.get(vy)?;
                self.write_with_flag(vx, source << 1, (source >> 7) & 1 == 1)?;
                PcUpdate::Next
            }
            OpCodes::SetIndexRegister(addr) => {
                self.regs.set_index(addr)?;
                PcUpdate::Next
            }
            OpCodes::JumpWithOffset(addr) => PcUpdate::Jump(addr + self.regs.get(0)? as u16),
            OpCodes::Random(vx, kk) => {
                let ransuu: u8 = self.rng.gen();
                self.regs.set_register(vx, (ransuu & kk) as u16)?;
                PcUpdate::Next
            }
            OpCodes::Display(reg_x, reg_y, height) => {
                let (x, y) = (self.regs.get(reg_x)?, self.regs.get(reg_y)?);
                let sprite = self.mem.slice(self.regs.index(), height as usize)?;
                let collision = paint(&mut self.fb, x, y, sprite);
                trace!("drew {height} rows at ({x}, {y}), collision {collision}");
                self.regs.set_flag(collision)?;
                PcUpdate::Next
            }
            OpCodes::SkipIfPressed(vx) => {
                let key = self.regs.get(vx)? & 0xF;
                PcUpdate::skip_if(self.keypad.is_pressed(key)?)
            }
            OpCodes::SkipIfNotPressed(vx) => {
                let key = self.regs.get(vx)? & 0xF;
                PcUpdate::skip_if(!self.keypad.is_pressed(key)?)
            }
            OpCodes::CopyDelayToRegister(vx) => {
                self.regs.set_register(vx, self.regs.delay_timer() as u16)?;
                PcUpdate::Next
            }
            OpCodes::GetKey(vx) => {
                // make sure the target exists before arming the wait
                self.regs.get(vx)?;
                self.keypad.on_next_key_press(vx);
                PcUpdate::Hold
            }
            OpCodes::CopyRegisterToDelay(vx) => {
                self.regs.set_delay_timer(self.regs.get(vx)?);
                PcUpdate::Next
            }
            OpCodes::CopyRegisterToSound(vx) => {
                self.regs.set_sound_timer(self.regs.get(vx)?);
                PcUpdate::Next
            }
            OpCodes::AddToIndex(vx) => {
                let value = self.regs.index() + self.regs.get(vx)? as u16;
                self.regs.set_index(value)?;
                PcUpdate::Next
            }
            OpCodes::PointChar(vx) => {
                self.regs.set_index(glyph_addr(self.regs.get(vx)?))?;
                PcUpdate::Next
            }
            OpCodes::ToDecimal(vx) => {
                let value = self.regs.get(vx)?;
                let index = self.regs.index();
                let digits = [value / 100, value / 10 % 10, value % 10];
                for (offset, digit) in digits.into_iter().enumerate() {
                    self.mem.set(index + offset as u16, digit)?;
                }
                PcUpdate::Next
            }
            OpCodes::StoreRegisterToMemory(vx) => {
                let index = self.regs.index();
                for reg in 0..=vx {
                    self.mem.set(index + reg as u16, self.regs.get(reg)?)?;
                }
                self.regs.set_index(index + vx as u16 + 1)?;
                PcUpdate::Next
            }
            OpCodes::LoadRegisterFromMemory(vx) => {
                let index = self.regs.index();
                for reg in 0..=vx {
                    let reg_val = self.mem.get(index + reg as u16)?;
                    self.regs.set_register(reg, reg_val as u16)?;
                }
                self.regs.set_index(index + vx as u16 + 1)?;
                PcUpdate::Next
            }
        };
        Ok(update)
    }

    fn apply(&mut self, update: PcUpdate) -> Result<(), Chip8Error> {
        let pc = self.regs.pc();
        match update {
            PcUpdate::Next => self.regs.set_pc(pc + INSTRUCTION_SIZE),
            PcUpdate::Skip => self.regs.set_pc(pc + 2 * INSTRUCTION_SIZE),
            PcUpdate::Jump(addr) => self.regs.set_pc(addr),
            PcUpdate::Hold => {
                self.set_state(RunState::AwaitingKey);
                Ok(())
            }
        }
    }

    fn halt_if_finished(&mut self) -> Result<(), Chip8Error> {
        if !self.has_more_instructions()? {
            debug!("pc {:#05X} left the program", self.regs.pc());
            self.set_state(RunState::Halted);
        }
        Ok(())
    }

    fn cycle(&mut self) -> Result<Cycle, Chip8Error> {
        self.halt_if_finished()?;
        if self.state == RunState::Halted {
            return Ok(Cycle::Halted);
        }

        let pc = self.regs.pc();
        let ins = self.fetch_decode()?;
        trace!("{pc:#05X} {ins:?}");
        let update = self.execute_ins(ins)?;
        self.apply(update)?;

        if self.state == RunState::Running {
            self.halt_if_finished()?;
        }
        Ok(Cycle::Executed(ins))
    }

    fn poll_key(&mut self) -> Result<Cycle, Chip8Error> {
        let Some((register, key)) = self.keypad.take_key_press() else {
            return Ok(Cycle::AwaitingKey);
        };

        self.regs.set_register(register, key as u16)?;
        self.apply(PcUpdate::Next)?;
        self.set_state(RunState::Running);
        self.halt_if_finished()?;
        Ok(Cycle::KeyReceived { register, key })
    }

    /// Runs at most one instruction. Timers are left alone; see [`Emulator::tick`].
    ///
    /// An error halts the machine and is kept around in [`Emulator::fault`].
    pub fn step(&mut self) -> Result<Cycle, Chip8Error> {
        let result = match self.state {
            RunState::Idle => return Err(Chip8Error::NoProgramLoaded),
            RunState::Halted => return Ok(Cycle::Halted),
            RunState::Paused => return Ok(Cycle::Paused),
            RunState::AwaitingKey => self.poll_key(),
            RunState::Running => self.cycle(),
        };

        if let Err(err) = &result {
            warn!("halting at {:#05X}: {err}", self.regs.pc());
            self.fault = Some(err.clone());
            self.set_state(RunState::Halted);
        }
        result
    }

    /// Executes exactly one instruction while paused and stays paused.
    /// Outside of a pause this is the same as `step`.
    pub fn single_step(&mut self) -> Result<Cycle, Chip8Error> {
        if self.state != RunState::Paused {
            return self.step();
        }

        self.state = self.resume_to;
        let result = self.step();
        if matches!(self.state, RunState::Running | RunState::AwaitingKey) {
            self.resume_to = self.state;
            self.state = RunState::Paused;
        }
        result
    }

    /// Decays the timers up to `now`, then steps once.
    pub fn tick(&mut self, now: Instant) -> Result<Cycle, Chip8Error> {
        self.sync_timers(now);
        self.step()
    }

    pub fn sync_timers(&mut self, now: Instant) {
        match self.state {
            RunState::Running | RunState::AwaitingKey => {
                let periods = self.timer.sync(now);
                if periods > 0 {
                    self.regs.decay_timers(periods);
                }
            }
            _ => self.timer.rebaseline(now),
        }
    }

    pub fn pause(&mut self) {
        if matches!(self.state, RunState::Running | RunState::AwaitingKey) {
            self.resume_to = self.state;
            self.set_state(RunState::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.state == RunState::Paused {
            // first sync after resuming starts a fresh baseline
            self.timer.reset();
            self.set_state(self.resume_to);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.state == RunState::Paused
    }

    pub fn press_key(&mut self, key: u8) -> Result<(), Chip8Error> {
        self.keypad.press(key)
    }

    pub fn release_key(&mut self, key: u8) -> Result<(), Chip8Error> {
        self.keypad.release(key)
    }

    /// A copy of the frame if anything changed since the last call.
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        self.fb.take_frame()
    }

    /// Whether the beeper should be on. A stopped machine is silent.
    pub fn sound_active(&self) -> bool {
        matches!(self.state, RunState::Running | RunState::AwaitingKey)
            && self.regs.sound_timer() > 0
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
