//! Autonomous frequency sweep used by AUTO mode.

use std::f64::consts::TAU;
use std::time::Instant;

use crate::types::{FREQUENCY_MAX, FREQUENCY_MIN};

/// Scaled seconds accumulated per wall-clock second.
pub const BASE_SPEED: f64 = 0.2;

const SWEEP_CENTER: f64 = 10.5;
const SWEEP_HALF_RANGE: f64 = 9.5;
const DRIFT_SPAN: f64 = 19.0;

/// 1 -> 20 -> 1 over one period of `2π` scaled time.
pub fn sweep_n(t: f64) -> f32 {
    clamp_frequency(SWEEP_CENTER - SWEEP_HALF_RANGE * t.cos())
}

/// Slow sawtooth drift from 1 towards 20, one unit per `2π` of scaled time.
pub fn sweep_m(t: f64) -> f32 {
    clamp_frequency(1.0 + (t / TAU).rem_euclid(DRIFT_SPAN))
}

fn clamp_frequency(v: f64) -> f32 {
    (v as f32).clamp(FREQUENCY_MIN, FREQUENCY_MAX)
}

#[derive(Debug, Default)]
pub struct AutoDriver {
    time: f64,
    enabled: bool,
    last_tick: Option<Instant>,
}

impl AutoDriver {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Scaled time accumulated so far.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Toggling keeps the accumulator; only the clock reference is dropped so
    /// time spent disabled is never counted.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::debug!(
                "auto mode {} at t={:.3}",
                if enabled { "on" } else { "off" },
                self.time
            );
        }
        self.enabled = enabled;
        self.last_tick = None;
    }

    pub fn frequencies(&self) -> (f32, f32) {
        (sweep_n(self.time), sweep_m(self.time))
    }

    /// Advance by `dt` wall-clock seconds and return the new `(n, m)` pair,
    /// or `None` while disabled.
    pub fn advance(&mut self, dt: f64) -> Option<(f32, f32)> {
        if !self.enabled {
            return None;
        }
        if dt.is_finite() && dt > 0.0 {
            self.time += dt * BASE_SPEED;
        }
        Some(self.frequencies())
    }

    /// Clock-driven form of [`AutoDriver::advance`]. The first tick after
    /// enabling only records the reference instant.
    pub fn tick(&mut self, now: Instant) -> Option<(f32, f32)> {
        if !self.enabled {
            return None;
        }
        let dt = self
            .last_tick
            .map(|last| now.saturating_duration_since(last).as_secs_f64())
            .unwrap_or(0.0);
        self.last_tick = Some(now);
        self.advance(dt)
    }
}
