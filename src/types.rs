pub const FREQUENCY_MIN: f32 = 1.0;
pub const FREQUENCY_MAX: f32 = 20.0;
pub const AMPLITUDE_MIN: f32 = 0.0;
pub const AMPLITUDE_MAX: f32 = 100.0;
pub const PARTICLE_COUNT_MIN: usize = 1_000;
pub const PARTICLE_COUNT_MAX: usize = 30_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum FieldMode {
    /// Square plate, superposition of two degenerate modes.
    #[default]
    Chladni,
    /// Two point sources on the horizontal axis.
    Interference,
}

impl FieldMode {
    pub fn label(self) -> &'static str {
        match self {
            FieldMode::Chladni => "Square Plate",
            FieldMode::Interference => "Dual Source",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParams {
    pub frequency_n: f32,
    pub frequency_m: f32,
    pub amplitude: f32,
    pub particle_count: usize,
    pub mode: FieldMode,
    // Inert: not read by the field math.
    pub speed: f32,
    pub resolution: f32,
    pub damping: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            frequency_n: 1.0,
            frequency_m: 1.0,
            amplitude: 100.0,
            particle_count: 15_000,
            mode: FieldMode::Chladni,
            speed: 1.0,
            resolution: 1.0,
            damping: 0.95,
        }
    }
}

impl SimulationParams {
    /// Copy with every field pulled into its documented range.
    pub fn clamped(&self) -> Self {
        Self {
            frequency_n: clamp_finite(self.frequency_n, FREQUENCY_MIN, FREQUENCY_MAX),
            frequency_m: clamp_finite(self.frequency_m, FREQUENCY_MIN, FREQUENCY_MAX),
            amplitude: clamp_finite(self.amplitude, AMPLITUDE_MIN, AMPLITUDE_MAX),
            particle_count: self
                .particle_count
                .clamp(PARTICLE_COUNT_MIN, PARTICLE_COUNT_MAX),
            ..*self
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    // Reserved; displacement is memoryless so these stay zero.
    pub vx: f32,
    pub vy: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UiFlags {
    pub show_field: bool,
    pub audio_on: bool,
    pub auto_mode: bool,
}

impl Default for UiFlags {
    fn default() -> Self {
        Self {
            show_field: false,
            audio_on: true,
            auto_mode: true,
        }
    }
}

pub fn clamp_finite(value: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = SimulationParams::default();
        assert_eq!(params.frequency_n, 1.0);
        assert_eq!(params.frequency_m, 1.0);
        assert_eq!(params.amplitude, 100.0);
        assert_eq!(params.particle_count, 15_000);
        assert_eq!(params.mode, FieldMode::Chladni);
    }

    #[test]
    fn test_clamped_pulls_into_range() {
        let params = SimulationParams {
            frequency_n: 42.0,
            frequency_m: -3.0,
            amplitude: 250.0,
            particle_count: 10,
            ..Default::default()
        }
        .clamped();

        assert_eq!(params.frequency_n, FREQUENCY_MAX);
        assert_eq!(params.frequency_m, FREQUENCY_MIN);
        assert_eq!(params.amplitude, AMPLITUDE_MAX);
        assert_eq!(params.particle_count, PARTICLE_COUNT_MIN);
    }

    #[test]
    fn test_clamped_replaces_non_finite() {
        let params = SimulationParams {
            frequency_n: f32::NAN,
            amplitude: f32::INFINITY,
            ..Default::default()
        }
        .clamped();

        assert_eq!(params.frequency_n, FREQUENCY_MIN);
        assert_eq!(params.amplitude, AMPLITUDE_MIN);
    }

    #[test]
    fn test_clamped_keeps_inert_fields() {
        let params = SimulationParams {
            speed: 3.0,
            damping: 0.5,
            ..Default::default()
        };
        let clamped = params.clamped();
        assert_eq!(clamped.speed, 3.0);
        assert_eq!(clamped.damping, 0.5);
        assert_eq!(clamped.resolution, params.resolution);
    }
}
