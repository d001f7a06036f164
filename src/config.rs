use std::time::Duration;

/// How many instructions run per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "frontend", derive(clap::ValueEnum))]
pub enum CpuSpeed {
    /// 250 Hz
    Half,
    /// 500 Hz
    #[default]
    Full,
    /// 1000 Hz
    Double,
}

impl CpuSpeed {
    pub fn hertz(self) -> u32 {
        match self {
            CpuSpeed::Half => 250,
            CpuSpeed::Full => 500,
            CpuSpeed::Double => 1000,
        }
    }

    pub fn cycle_time(self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.hertz() as u64)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub speed: CpuSpeed,
    /// Fixed seed for `RND`, otherwise seeded from the OS.
    pub seed: Option<u64>,
}
