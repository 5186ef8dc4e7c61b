//! Coarse node/antinode grid drawn under the particles when "See Force" is on.

use crate::field;
use crate::types::{FieldMode, SimulationParams};

pub const DEFAULT_RESOLUTION: usize = 100;
pub const NODE_THRESHOLD: f32 = 0.1;
pub const NODE_ALPHA: f32 = 0.3;
pub const ANTINODE_ALPHA_GAIN: f32 = 0.2;
pub const ANTINODE_ALPHA_MAX: f32 = 0.5;
pub const NODE_RGB: [u8; 3] = [16, 185, 129];
pub const ANTINODE_RGB: [u8; 3] = [239, 68, 68];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellClass {
    Node,
    Antinode { alpha: f32 },
}

impl CellClass {
    pub fn classify(intensity: f32) -> Self {
        if intensity < NODE_THRESHOLD {
            CellClass::Node
        } else {
            CellClass::Antinode {
                alpha: (intensity * ANTINODE_ALPHA_GAIN).min(ANTINODE_ALPHA_MAX),
            }
        }
    }

    /// Straight RGB plus coverage in `[0, 1]`.
    pub fn color(self) -> ([u8; 3], f32) {
        match self {
            CellClass::Node => (NODE_RGB, NODE_ALPHA),
            CellClass::Antinode { alpha } => (ANTINODE_RGB, alpha),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct OverlayKey {
    mode: FieldMode,
    freq_n: f32,
    freq_m: f32,
    resolution: usize,
}

pub struct FieldOverlay {
    resolution: usize,
    cells: Vec<CellClass>,
    key: Option<OverlayKey>,
}

impl Default for FieldOverlay {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION)
    }
}

impl FieldOverlay {
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution: resolution.max(1),
            cells: Vec::new(),
            key: None,
        }
    }

    pub fn compute(mode: FieldMode, freq_n: f32, freq_m: f32, resolution: usize) -> Self {
        let mut overlay = Self::new(resolution);
        overlay.rebuild(mode, freq_n, freq_m);
        overlay
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn cells(&self) -> &[CellClass] {
        &self.cells
    }

    /// Cell at column `i`, row `j`.
    pub fn cell(&self, i: usize, j: usize) -> Option<CellClass> {
        if i >= self.resolution || j >= self.resolution {
            return None;
        }
        self.cells.get(j * self.resolution + i).copied()
    }

    pub fn set_resolution(&mut self, resolution: usize) {
        self.resolution = resolution.max(1);
    }

    /// Recompute only if the mode, frequencies or resolution moved since the
    /// last build. Returns whether a rebuild happened.
    pub fn refresh(&mut self, params: &SimulationParams) -> bool {
        let key = OverlayKey {
            mode: params.mode,
            freq_n: params.frequency_n,
            freq_m: params.frequency_m,
            resolution: self.resolution,
        };
        if self.key == Some(key) {
            return false;
        }
        *self = Self::compute(
            params.mode,
            params.frequency_n,
            params.frequency_m,
            self.resolution,
        );
        true
    }

    /// Share of cells classified as nodes, 0 before the first build.
    pub fn node_fraction(&self) -> f32 {
        if self.cells.is_empty() {
            return 0.0;
        }
        let nodes = self.cells.iter().filter(|c| **c == CellClass::Node).count();
        nodes as f32 / self.cells.len() as f32
    }

    fn rebuild(&mut self, mode: FieldMode, freq_n: f32, freq_m: f32) {
        let res = self.resolution;
        let inv = 1.0 / res as f32;

        self.cells.clear();
        self.cells.reserve(res * res);
        for j in 0..res {
            let y = (j as f32 + 0.5) * inv;
            for i in 0..res {
                let x = (i as f32 + 0.5) * inv;
                let intensity = field::evaluate_at(mode, x, y, freq_n, freq_m).abs();
                self.cells.push(CellClass::classify(intensity));
            }
        }

        self.key = Some(OverlayKey {
            mode,
            freq_n,
            freq_m,
            resolution: res,
        });
    }
}
