//! A CHIP-8 virtual machine.
//!
//! [`emulator::Emulator`] owns the whole machine and executes one instruction per
//! [`emulator::Emulator::step`]. [`runner::Runner`] puts it on a thread of its own
//! and keeps timers, key events and frame reads consistent with each other.
//!
//! ```
//! use chipvm::emulator::{Emulator, RunState};
//!
//! let mut emu = Emulator::new();
//! // V0 = 0x2A
//! emu.load_program(&[0x60, 0x2A]).unwrap();
//! emu.step().unwrap();
//! assert_eq!(emu.regs.get(0), Ok(0x2A));
//! assert_eq!(emu.state(), RunState::Halted);
//! ```

pub mod config;
pub mod decode;
pub mod disasm;
pub mod display;
pub mod emulator;
pub mod error;
pub mod keyboard;
pub mod memory;
pub mod registers;
pub mod runner;
pub mod timer;

pub use config::{Config, CpuSpeed};
pub use emulator::{Cycle, Emulator, RunState};
pub use error::Chip8Error;
pub use runner::Runner;
