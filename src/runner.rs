use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    thread::{self, JoinHandle},
    time::Instant,
};

use log::{debug, info, warn};

use crate::{
    config::Config,
    display::FrameBuffer,
    emulator::{Cycle, Emulator, RunState},
    error::Chip8Error,
    registers::Registers,
};

fn lock(emulator: &Mutex<Emulator>) -> MutexGuard<'_, Emulator> {
    // a panic mid-cycle still leaves the machine worth inspecting
    emulator.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives an [`Emulator`] on its own thread at the configured instruction rate.
///
/// Every tick takes the lock once, so key events, pause requests and frame reads
/// from other threads always land between two whole cycles.
pub struct Runner {
    emulator: Arc<Mutex<Emulator>>,
    stopped: Arc<AtomicBool>,
    worker: Option<JoinHandle<Result<(), Chip8Error>>>,
}

impl Runner {
    pub fn spawn(emulator: Emulator, config: &Config) -> Self {
        let emulator = Arc::new(Mutex::new(emulator));
        let stopped = Arc::new(AtomicBool::new(false));
        let cycle_time = config.speed.cycle_time();
        let hertz = config.speed.hertz();

        let worker = {
            let emulator = Arc::clone(&emulator);
            let stopped = Arc::clone(&stopped);
            thread::spawn(move || {
                debug!("runner started at {hertz} Hz");
                while !stopped.load(Ordering::Acquire) {
                    let started = Instant::now();
                    let result = lock(&emulator).tick(started);
                    match result {
                        Ok(Cycle::Halted) => {
                            info!("program finished");
                            return Ok(());
                        }
                        Ok(_) => {}
                        Err(err) => {
                            warn!("runner stopped: {err}");
                            return Err(err);
                        }
                    }

                    let elapsed = started.elapsed();
                    if elapsed < cycle_time {
                        thread::sleep(cycle_time - elapsed);
                    }
                }
                debug!("runner stopped on request");
                Ok(())
            })
        };

        Self {
            emulator,
            stopped,
            worker: Some(worker),
        }
    }

    pub fn press(&self, key: u8) -> Result<(), Chip8Error> {
        lock(&self.emulator).press_key(key)
    }

    pub fn release(&self, key: u8) -> Result<(), Chip8Error> {
        lock(&self.emulator).release_key(key)
    }

    pub fn pause(&self) {
        lock(&self.emulator).pause();
    }

    pub fn resume(&self) {
        lock(&self.emulator).resume();
    }

    pub fn is_paused(&self) -> bool {
        lock(&self.emulator).is_paused()
    }

    pub fn state(&self) -> RunState {
        lock(&self.emulator).state()
    }

    /// The latest complete frame, if it changed since the last call.
    pub fn frame(&self) -> Option<FrameBuffer> {
        lock(&self.emulator).take_frame()
    }

    pub fn snapshot(&self) -> Registers {
        lock(&self.emulator).regs.clone()
    }

    pub fn sound_active(&self) -> bool {
        lock(&self.emulator).sound_active()
    }

    pub fn fault(&self) -> Option<Chip8Error> {
        lock(&self.emulator).fault().cloned()
    }

    /// Runs `f` with the machine locked. The worker is held off until it returns.
    pub fn with_emulator<T>(&self, f: impl FnOnce(&mut Emulator) -> T) -> T {
        f(&mut lock(&self.emulator))
    }

    /// Asks the worker to finish after its current cycle. Safe to call repeatedly.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::AcqRel) {
            debug!("stop requested");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.worker
            .as_ref()
            .map_or(true, |worker| worker.is_finished())
    }

    /// Stops the worker and waits for it. Returns the error that halted the
    /// machine, if there was one.
    pub fn join(mut self) -> Result<(), Chip8Error> {
        self.stop();
        self.wait()
    }

    fn wait(&mut self) -> Result<(), Chip8Error> {
        match self.worker.take() {
            Some(worker) => match worker.join() {
                Ok(result) => result,
                // the worker panicked; report what the machine recorded
                Err(_) => self.fault().map_or(Ok(()), Err),
            },
            None => Ok(()),
        }
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        self.stop();
        let _ = self.wait();
    }
}
