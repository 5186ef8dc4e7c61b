//! Per-frame compositing onto an RGBA8 surface: background, optional field
//! overlay, then the particles.

use crate::field_overlay::FieldOverlay;
use crate::particles::{ParticleSystem, StepStats};
use crate::types::SimulationParams;

pub const BACKGROUND_RGB: [u8; 3] = [0x1e, 0x29, 0x3b];
pub const PLATE_RGB: [u8; 3] = [0x0f, 0x17, 0x2a];
pub const SAND_RGB: [u8; 3] = [0x4a, 0xde, 0x80];
pub const PARTICLE_SIZE: f32 = 1.5;

/// Centered square plate inside a `width x height` surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlateRect {
    pub offset_x: f32,
    pub offset_y: f32,
    pub scale: f32,
}

impl PlateRect {
    pub fn fit(width: usize, height: usize) -> Self {
        let (w, h) = (width as f32, height as f32);
        let scale = w.min(h);
        Self {
            offset_x: (w - scale) / 2.0,
            offset_y: (h - scale) / 2.0,
            scale,
        }
    }

    /// Plate-local `[0, 1]` coordinates to surface pixels.
    pub fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (self.offset_x + x * self.scale, self.offset_y + y * self.scale)
    }
}

pub struct FrameSurface {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl FrameSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 4],
        }
    }

    pub fn dimensions(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns whether the size actually changed.
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height * 4, 0);
        true
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        let px = &self.pixels[idx..idx + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn clear(&mut self, rgb: [u8; 3]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
    }

    /// Source-over fill of the pixel-aligned rectangle covering
    /// `[x, x + w) x [y, y + h)`, clipped to the surface.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rgb: [u8; 3], alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 || w <= 0.0 || h <= 0.0 {
            return;
        }
        let Some((x0, x1)) = pixel_span(x, w, self.width) else {
            return;
        };
        let Some((y0, y1)) = pixel_span(y, h, self.height) else {
            return;
        };

        for row in y0..y1 {
            let start = (row * self.width + x0) * 4;
            let end = (row * self.width + x1) * 4;
            for px in self.pixels[start..end].chunks_exact_mut(4) {
                blend(px, rgb, alpha);
            }
        }
    }
}

fn pixel_span(start: f32, len: f32, limit: usize) -> Option<(usize, usize)> {
    let lo = start.round().max(0.0);
    let hi = (start + len).round().min(limit as f32);
    if lo >= hi {
        return None;
    }
    Some((lo as usize, hi as usize))
}

fn blend(px: &mut [u8], rgb: [u8; 3], alpha: f32) {
    for c in 0..3 {
        let dst = px[c] as f32;
        px[c] = (dst + (rgb[c] as f32 - dst) * alpha).round() as u8;
    }
    px[3] = 255;
}

/// Owns the simulation state drawn each frame.
pub struct RenderLoop {
    particles: ParticleSystem,
    overlay: FieldOverlay,
    last_stats: StepStats,
}

impl RenderLoop {
    pub fn new(particles: ParticleSystem) -> Self {
        Self {
            particles,
            overlay: FieldOverlay::default(),
            last_stats: StepStats::default(),
        }
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn overlay(&self) -> &FieldOverlay {
        &self.overlay
    }

    pub fn last_stats(&self) -> StepStats {
        self.last_stats
    }

    /// Draw one frame. Returns `false` without touching anything when the
    /// surface has no area.
    pub fn frame(
        &mut self,
        surface: &mut FrameSurface,
        params: &SimulationParams,
        show_field: bool,
    ) -> bool {
        if surface.is_empty() {
            return false;
        }

        let params = params.clamped();
        self.particles.sync_count(params.particle_count);

        let [width, height] = surface.dimensions();
        let plate = PlateRect::fit(width, height);

        surface.clear(BACKGROUND_RGB);
        surface.fill_rect(
            plate.offset_x,
            plate.offset_y,
            plate.scale,
            plate.scale,
            PLATE_RGB,
            1.0,
        );

        if show_field {
            self.overlay.refresh(&params);
            draw_overlay(surface, &plate, &self.overlay);
        }

        self.last_stats = self.particles.step(&params);
        for p in self.particles.particles() {
            let (sx, sy) = plate.to_screen(p.x, p.y);
            surface.fill_rect(sx, sy, PARTICLE_SIZE, PARTICLE_SIZE, SAND_RGB, 1.0);
        }

        true
    }
}

fn draw_overlay(surface: &mut FrameSurface, plate: &PlateRect, overlay: &FieldOverlay) {
    let res = overlay.resolution();
    let cell = plate.scale / res as f32;
    for (idx, class) in overlay.cells().iter().enumerate() {
        let (i, j) = (idx % res, idx / res);
        let (rgb, alpha) = class.color();
        surface.fill_rect(
            plate.offset_x + i as f32 * cell,
            plate.offset_y + j as f32 * cell,
            cell,
            cell,
            rgb,
            alpha,
        );
    }
}
