use clap::Parser;

use crate::types::{FieldMode, SimulationParams, UiFlags};

/// Sand on a vibrating plate: Chladni figures and two-source interference.
#[derive(Parser, Debug)]
#[command(name = "cymatics", version, about, long_about = None)]
pub struct Cli {
    /// Field function driving the plate
    #[arg(long, value_enum, default_value_t = FieldMode::Chladni)]
    pub mode: FieldMode,

    /// First modal index (1-20)
    #[arg(short = 'n', long, default_value_t = 1.0)]
    pub frequency_n: f32,

    /// Second modal index (1-20)
    #[arg(short = 'm', long, default_value_t = 1.0)]
    pub frequency_m: f32,

    /// Vibration strength in percent (0-100)
    #[arg(short, long, default_value_t = 100.0)]
    pub amplitude: f32,

    /// Number of sand particles (1000-30000)
    #[arg(short, long, default_value_t = 15_000)]
    pub particles: usize,

    /// Start with the force overlay visible
    #[arg(long)]
    pub show_field: bool,

    /// Start muted
    #[arg(long)]
    pub no_audio: bool,

    /// Start with the automatic sweep off
    #[arg(long)]
    pub no_auto: bool,

    /// Seed for particle placement, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn params(&self) -> SimulationParams {
        SimulationParams {
            frequency_n: self.frequency_n,
            frequency_m: self.frequency_m,
            amplitude: self.amplitude,
            particle_count: self.particles,
            mode: self.mode,
            ..Default::default()
        }
        .clamped()
    }

    pub fn flags(&self) -> UiFlags {
        UiFlags {
            show_field: self.show_field,
            audio_on: !self.no_audio,
            auto_mode: !self.no_auto,
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}
