use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::field;
use crate::types::{clamp_finite, Particle, SimulationParams, AMPLITUDE_MAX, AMPLITUDE_MIN};

/// Per-frame displacement at 100% amplitude, as a fraction of the plate width.
pub const MAX_MOVE: f32 = 0.02;

/// Quadratic amplitude response: 100% gives [`MAX_MOVE`], 0% gives nothing.
pub fn vibration_strength(amplitude: f32) -> f32 {
    let normalized = clamp_finite(amplitude, AMPLITUDE_MIN, AMPLITUDE_MAX) / AMPLITUDE_MAX;
    normalized * normalized * MAX_MOVE
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    pub respawned: usize,
}

pub struct ParticleSystem {
    particles: Vec<Particle>,
    rng: StdRng,
}

impl ParticleSystem {
    pub fn new(count: usize) -> Self {
        Self::from_rng(count, StdRng::from_entropy())
    }

    pub fn with_seed(count: usize, seed: u64) -> Self {
        Self::from_rng(count, StdRng::seed_from_u64(seed))
    }

    fn from_rng(count: usize, rng: StdRng) -> Self {
        let mut system = Self {
            particles: Vec::new(),
            rng,
        };
        system.resize(count);
        system
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Discard every particle and scatter `count` fresh ones uniformly.
    pub fn resize(&mut self, count: usize) {
        let rng = &mut self.rng;
        self.particles = (0..count)
            .map(|_| Particle {
                x: rng.gen(),
                y: rng.gen(),
                vx: 0.0,
                vy: 0.0,
            })
            .collect();
        log::debug!("allocated {count} particles");
    }

    /// Resize only when the target count differs. Returns whether it did.
    pub fn sync_count(&mut self, count: usize) -> bool {
        if self.particles.len() == count {
            return false;
        }
        self.resize(count);
        true
    }

    pub fn step(&mut self, params: &SimulationParams) -> StepStats {
        let strength = vibration_strength(params.amplitude);
        let mut stats = StepStats::default();
        if strength == 0.0 {
            return stats;
        }

        let mode = params.mode;
        let (freq_n, freq_m) = (params.frequency_n, params.frequency_m);
        let rng = &mut self.rng;

        for p in &mut self.particles {
            let value = field::evaluate_at(mode, p.x, p.y, freq_n, freq_m);
            let shake = if value.is_finite() {
                value.abs() * strength
            } else {
                0.0
            };

            p.x += (rng.gen::<f32>() - 0.5) * shake;
            p.y += (rng.gen::<f32>() - 0.5) * shake;

            // NaN fails the range check too.
            if !(0.0..=1.0).contains(&p.x) || !(0.0..=1.0).contains(&p.y) {
                p.x = rng.gen();
                p.y = rng.gen();
                stats.respawned += 1;
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldMode;

    fn in_unit_square(system: &ParticleSystem) -> bool {
        system
            .particles()
            .iter()
            .all(|p| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y))
    }

    fn mean_abs_field(system: &ParticleSystem, params: &SimulationParams) -> f32 {
        let sum: f32 = system
            .particles()
            .iter()
            .map(|p| {
                field::evaluate_at(
                    params.mode,
                    p.x,
                    p.y,
                    params.frequency_n,
                    params.frequency_m,
                )
                .abs()
            })
            .sum();
        sum / system.len() as f32
    }

    #[test]
    fn test_vibration_strength_curve() {
        assert_eq!(vibration_strength(100.0), 0.02);
        assert_eq!(vibration_strength(0.0), 0.0);
        assert!((vibration_strength(50.0) - 0.005).abs() < 1.0e-7);
    }

    #[test]
    fn test_vibration_strength_clamps() {
        assert_eq!(vibration_strength(500.0), 0.02);
        assert_eq!(vibration_strength(-20.0), 0.0);
        assert_eq!(vibration_strength(f32::NAN), 0.0);
    }

    #[test]
    fn test_new_fills_unit_square() {
        let system = ParticleSystem::with_seed(5_000, 7);
        assert_eq!(system.len(), 5_000);
        assert!(in_unit_square(&system));
        assert!(system.particles().iter().all(|p| p.vx == 0.0 && p.vy == 0.0));
    }

    #[test]
    fn test_count_invariant_across_steps() {
        let mut system = ParticleSystem::with_seed(2_000, 1);
        let params = SimulationParams {
            frequency_n: 3.0,
            frequency_m: 7.0,
            ..Default::default()
        };
        for _ in 0..100 {
            system.step(&params);
            assert_eq!(system.len(), 2_000);
        }
    }

    #[test]
    fn test_sync_count_replaces_collection() {
        let mut system = ParticleSystem::with_seed(1_000, 2);
        assert!(!system.sync_count(1_000));
        assert!(system.sync_count(4_000));
        assert_eq!(system.len(), 4_000);
        assert!(system.sync_count(1_500));
        assert_eq!(system.len(), 1_500);
        assert!(in_unit_square(&system));
    }

    #[test]
    fn test_positions_stay_in_bounds() {
        let mut system = ParticleSystem::with_seed(3_000, 3);
        for mode in [FieldMode::Chladni, FieldMode::Interference] {
            let params = SimulationParams {
                frequency_n: 2.0,
                frequency_m: 13.0,
                mode,
                ..Default::default()
            };
            for _ in 0..200 {
                system.step(&params);
                assert!(in_unit_square(&system));
            }
        }
    }

    #[test]
    fn test_out_of_range_inputs_stay_in_bounds() {
        let mut system = ParticleSystem::with_seed(1_000, 4);
        let params = SimulationParams {
            frequency_n: f32::NAN,
            frequency_m: 1.0e9,
            amplitude: 1.0e6,
            ..Default::default()
        };
        for _ in 0..50 {
            system.step(&params);
        }
        assert!(in_unit_square(&system));
        assert!(system
            .particles()
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn test_zero_amplitude_freezes_positions() {
        let mut system = ParticleSystem::with_seed(1_000, 5);
        let before = system.particles().to_vec();
        let params = SimulationParams {
            amplitude: 0.0,
            frequency_n: 4.0,
            frequency_m: 9.0,
            ..Default::default()
        };
        for _ in 0..20 {
            let stats = system.step(&params);
            assert_eq!(stats.respawned, 0);
        }
        assert_eq!(system.particles(), &before[..]);
    }

    #[test]
    fn test_degenerate_chladni_leaves_particles_untouched() {
        let mut system = ParticleSystem::with_seed(1_000, 6);
        let before = system.particles().to_vec();
        let params = SimulationParams {
            frequency_n: 1.0,
            frequency_m: 1.0,
            amplitude: 100.0,
            mode: FieldMode::Chladni,
            ..Default::default()
        };
        for _ in 0..50 {
            assert_eq!(system.step(&params).respawned, 0);
        }
        assert_eq!(system.particles(), &before[..]);
    }

    #[test]
    fn test_particles_gather_on_nodal_lines() {
        let mut system = ParticleSystem::with_seed(4_000, 8);
        let params = SimulationParams {
            frequency_n: 1.0,
            frequency_m: 3.0,
            amplitude: 100.0,
            mode: FieldMode::Chladni,
            ..Default::default()
        };
        let initial = mean_abs_field(&system, &params);
        for _ in 0..1_000 {
            system.step(&params);
        }
        let settled = mean_abs_field(&system, &params);
        assert!(
            settled < initial * 0.9,
            "expected accumulation at nodes: initial {initial}, settled {settled}"
        );
    }
}
