// Keys:
//      1 2 3 4         1 2 3 C
//      Q W E R   ->    4 5 6 D
//      A S D F         7 8 9 E
//      Z X C V         A 0 B F
//
//      Space: pause/resume, N: next instruction while paused, ESC: exit

use std::{error::Error, fs, path::PathBuf};

use clap::Parser;
use log::{info, warn};

use chipvm::{
    config::{Config, CpuSpeed},
    disasm,
    emulator::Emulator,
    runner::Runner,
};
use sound::Sound;
use window::Window;

mod sound;
mod window;

#[derive(Parser, Debug)]
#[command(version, about = "Plays a CHIP-8 ROM")]
struct Args {
    /// ROM image to load at 0x200
    rom: PathBuf,

    #[arg(long, value_enum, default_value_t = CpuSpeed::Full)]
    speed: CpuSpeed,

    /// Pixel size of one CHIP-8 pixel
    #[arg(long, default_value_t = 16)]
    scale: usize,

    /// Seed for RND, random by default
    #[arg(long)]
    seed: Option<u64>,

    /// Print a listing of the ROM and exit
    #[arg(long)]
    disassemble: bool,

    #[arg(long)]
    mute: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("chipvm", log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let rom = fs::read(&args.rom)?;

    if args.disassemble {
        for line in disasm::disassemble(&rom)? {
            println!("{line}");
        }
        return Ok(());
    }

    let config = Config {
        speed: args.speed,
        seed: args.seed,
    };
    let mut emu = Emulator::with_config(&config);
    emu.load_program(&rom)?;
    info!("{} loaded, {} bytes", args.rom.display(), rom.len());

    let mut sound = if args.mute {
        None
    } else {
        match Sound::new() {
            Ok(sound) => Some(sound),
            Err(err) => {
                warn!("no sound: {err}");
                None
            }
        }
    };

    let title = format!("chipvm - {} - ESC to exit", args.rom.display());
    let mut window = Window::new(&title, window::scale_from(args.scale))?;
    let runner = Runner::spawn(emu, &config);

    while window.is_open() {
        for key in window.keys_pressed() {
            runner.press(key)?;
        }
        for key in window.keys_released() {
            runner.release(key)?;
        }

        if window.pause_toggled() {
            if runner.is_paused() {
                runner.resume();
            } else {
                runner.pause();
            }
        } else if runner.is_paused() && window.step_requested() {
            runner.with_emulator(|emu| emu.single_step())?;
        }

        match runner.frame() {
            Some(frame) => window.render(&frame)?,
            None => window.refresh(),
        }

        if let Some(sound) = sound.as_mut() {
            sound.set_playing(runner.sound_active())?;
        }

        if runner.fault().is_some() {
            break;
        }
    }

    runner.join()?;
    Ok(())
}
