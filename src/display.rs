pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// The surface sprites are blitted onto.
///
/// Coordinates are always already wrapped into `0..WIDTH` and `0..HEIGHT` by the
/// caller, so implementations only need to store what they are told.
pub trait Screen {
    fn set_pixel(&mut self, x: usize, y: usize, on: bool);
    fn read_pixel(&self, x: usize, y: usize) -> bool;
    fn clear(&mut self);
}

/// XORs `sprite` onto `screen` with its top-left corner at (`x`, `y`).
///
/// Each byte is one row, most significant bit leftmost. Rows and columns that
/// run off an edge wrap around to the opposite side. Returns true if any pixel
/// that was on got switched off.
pub fn paint<S: Screen + ?Sized>(screen: &mut S, x: u8, y: u8, sprite: &[u8]) -> bool {
    let mut collision = false;
    for (i, row) in sprite.iter().enumerate() {
        let ny = (y as usize + i) % HEIGHT;
        for j in 0..8 {
            let bit = (row >> (7 - j)) & 1 == 1;
            if !bit {
                continue;
            }
            let nx = (x as usize + j) % WIDTH;
            let previous = screen.read_pixel(nx, ny);
            if previous {
                collision = true;
            }
            screen.set_pixel(nx, ny, !previous);
        }
    }
    collision
}

/// 64x32 monochrome frame, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    bit_buffer: Vec<bool>,
    dirty: bool,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            bit_buffer: vec![false; WIDTH * HEIGHT],
            dirty: true,
        }
    }

    pub fn pixels(&self) -> &[bool] {
        &self.bit_buffer
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Hands back a copy of the frame if it changed since the last call.
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        let mut frame = self.clone();
        frame.dirty = false;
        Some(frame)
    }

    pub fn lit_count(&self) -> usize {
        self.bit_buffer.iter().filter(|on| **on).count()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for FrameBuffer {
    fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        let index = (y % HEIGHT) * WIDTH + (x % WIDTH);
        if self.bit_buffer[index] != on {
            self.bit_buffer[index] = on;
            self.dirty = true;
        }
    }

    fn read_pixel(&self, x: usize, y: usize) -> bool {
        self.bit_buffer[(y % HEIGHT) * WIDTH + (x % WIDTH)]
    }

    fn clear(&mut self) {
        self.bit_buffer = vec![false; WIDTH * HEIGHT];
        self.dirty = true;
    }
}
