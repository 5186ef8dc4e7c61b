//! Closed-form standing-wave fields sampled by the particles and the overlay.

use std::f32::consts::PI;

use crate::types::FieldMode;

const SOURCE_OFFSET: f32 = 0.5;
const WAVENUMBER_SCALE: f32 = 10.0;

/// Map a plate-local coordinate in `[0, 1]` to `[-1, 1]`.
#[inline]
pub fn to_plate_centered(v: f32) -> f32 {
    v * 2.0 - 1.0
}

/// Field displacement at plate-centered `(nx, ny)`.
///
/// In chladni mode `freq_n` and `freq_m` are symmetric modal indices and the
/// field vanishes identically when they are equal. In interference mode
/// `freq_m` scales the spatial wavenumber and `freq_n` is the phase offset of
/// the second source.
#[inline]
pub fn evaluate(mode: FieldMode, nx: f32, ny: f32, freq_n: f32, freq_m: f32) -> f32 {
    match mode {
        FieldMode::Chladni => chladni(nx, ny, freq_n, freq_m),
        FieldMode::Interference => interference(nx, ny, freq_n, freq_m),
    }
}

/// Same as [`evaluate`] for plate-local coordinates.
#[inline]
pub fn evaluate_at(mode: FieldMode, x: f32, y: f32, freq_n: f32, freq_m: f32) -> f32 {
    evaluate(
        mode,
        to_plate_centered(x),
        to_plate_centered(y),
        freq_n,
        freq_m,
    )
}

fn chladni(nx: f32, ny: f32, freq_n: f32, freq_m: f32) -> f32 {
    let n_pi = freq_n * PI;
    let m_pi = freq_m * PI;
    (n_pi * nx).cos() * (m_pi * ny).cos() - (m_pi * nx).cos() * (n_pi * ny).cos()
}

fn interference(nx: f32, ny: f32, freq_n: f32, freq_m: f32) -> f32 {
    let d1 = ((nx + SOURCE_OFFSET).powi(2) + ny * ny).sqrt();
    let d2 = ((nx - SOURCE_OFFSET).powi(2) + ny * ny).sqrt();
    let k = freq_m * WAVENUMBER_SCALE;
    (d1 * k).sin() + (d2 * k + freq_n).sin()
}
