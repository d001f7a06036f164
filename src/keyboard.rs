use crate::error::Chip8Error;

pub const NUM_KEYS: usize = 16;

/// Progress of an outstanding `LD Vx, K`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyWait {
    #[default]
    Idle,
    /// Waiting for the next press, which goes into `register`.
    Waiting { register: u8 },
    /// A press arrived; the controller has not picked it up yet.
    Resolved { register: u8, key: u8 },
}

/// State of the 16-key hex keypad.
///
/// ```text
/// |1|2|3|C|
/// |4|5|6|D|
/// |7|8|9|E|
/// |A|0|B|F|
/// ```
#[derive(Debug, Clone, Default)]
pub struct Keypad {
    keys: [bool; NUM_KEYS],
    last_pressed: Option<u8>,
    wait: KeyWait,
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(key: u8) -> Result<usize, Chip8Error> {
        if (key as usize) < NUM_KEYS {
            Ok(key as usize)
        } else {
            Err(Chip8Error::InvalidKey { key })
        }
    }

    pub fn press(&mut self, key: u8) -> Result<(), Chip8Error> {
        let index = Self::check(key)?;
        self.keys[index] = true;
        self.last_pressed = Some(key);
        if let KeyWait::Waiting { register } = self.wait {
            self.wait = KeyWait::Resolved { register, key };
        }
        Ok(())
    }

    pub fn release(&mut self, key: u8) -> Result<(), Chip8Error> {
        let index = Self::check(key)?;
        self.keys[index] = false;
        Ok(())
    }

    pub fn is_pressed(&self, key: u8) -> Result<bool, Chip8Error> {
        Ok(self.keys[Self::check(key)?])
    }

    pub fn last_key_pressed(&self) -> Option<u8> {
        self.last_pressed
    }

    /// Arms a one-shot wait: the next `press` is recorded for `register`.
    pub fn on_next_key_press(&mut self, register: u8) {
        self.wait = KeyWait::Waiting { register };
    }

    /// Drops any outstanding wait without touching held keys.
    pub fn cancel_wait(&mut self) {
        self.wait = KeyWait::Idle;
    }

    pub fn wait(&self) -> KeyWait {
        self.wait
    }

    /// Takes a resolved wait, leaving the keypad idle. Returns `(register, key)`.
    pub fn take_key_press(&mut self) -> Option<(u8, u8)> {
        match self.wait {
            KeyWait::Resolved { register, key } => {
                self.wait = KeyWait::Idle;
                Some((register, key))
            }
            _ => None,
        }
    }
}

#[cfg(feature = "frontend")]
pub fn key_to_num(key: minifb::Key) -> Option<u8> {
    use minifb::Key;

    match key {
        Key::Key1 => Some(0x1),
        Key::Key2 => Some(0x2),
        Key::Key3 => Some(0x3),
        Key::Key4 => Some(0xC),
        Key::Q => Some(0x4),
        Key::W => Some(0x5),
        Key::E => Some(0x6),
        Key::R => Some(0xD),
        Key::A => Some(0x7),
        Key::S => Some(0x8),
        Key::D => Some(0x9),
        Key::F => Some(0xE),
        Key::Z => Some(0xA),
        Key::X => Some(0x0),
        Key::C => Some(0xB),
        Key::V => Some(0xF),
        _ => None,
    }
}
