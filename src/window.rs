use std::time::Duration;

use minifb::{Key, KeyRepeat, Scale, WindowOptions};

use chipvm::display::{FrameBuffer, HEIGHT, WIDTH};
use chipvm::keyboard::key_to_num;

const OFF: u32 = from_u16_rgb(0, 0, 0);
const ON: u32 = from_u16_rgb(0, 127, 255);

const fn from_u16_rgb(r: u16, g: u16, b: u16) -> u32 {
    let (r, g, b) = (r as u32, g as u32, b as u32);
    (r << 16) | (g << 8) | b
}

pub fn scale_from(factor: usize) -> Scale {
    match factor {
        0 | 1 => Scale::X1,
        2 => Scale::X2,
        3 | 4 => Scale::X4,
        5..=8 => Scale::X8,
        9..=16 => Scale::X16,
        _ => Scale::X32,
    }
}

/// The player window: draws frames and turns keyboard events into keypad indices.
pub struct Window {
    window: minifb::Window,
    pixel_buffer: Vec<u32>,
}

impl Window {
    pub fn new(title: &str, scale: Scale) -> Result<Self, minifb::Error> {
        let mut window = minifb::Window::new(
            title,
            WIDTH,
            HEIGHT,
            WindowOptions {
                scale,
                ..WindowOptions::default()
            },
        )?;
        // Limit to max ~60 fps update rate
        window.limit_update_rate(Some(Duration::from_micros(16600)));
        Ok(Self {
            window,
            pixel_buffer: vec![OFF; WIDTH * HEIGHT],
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    pub fn render(&mut self, frame: &FrameBuffer) -> Result<(), minifb::Error> {
        for (pixel, on) in self.pixel_buffer.iter_mut().zip(frame.pixels()) {
            *pixel = if *on { ON } else { OFF };
        }
        self.window
            .update_with_buffer(&self.pixel_buffer, WIDTH, HEIGHT)
    }

    /// Pumps window events without a new frame.
    pub fn refresh(&mut self) {
        self.window.update();
    }

    pub fn keys_pressed(&self) -> Vec<u8> {
        self.window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .filter_map(key_to_num)
            .collect()
    }

    pub fn keys_released(&self) -> Vec<u8> {
        self.window
            .get_keys_released()
            .into_iter()
            .filter_map(key_to_num)
            .collect()
    }

    pub fn pause_toggled(&self) -> bool {
        self.window.is_key_pressed(Key::Space, KeyRepeat::No)
    }

    pub fn step_requested(&self) -> bool {
        self.window.is_key_pressed(Key::N, KeyRepeat::Yes)
    }
}
