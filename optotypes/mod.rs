//! Optotype rasterization: Sloan letters and tumbling-E, each drawn on a
//! 5x5 unit stroke grid and passed through the bandpass filter to produce
//! the final acuity-limited template.

pub mod sloan;
pub mod tumbling_e;

use crate::bandpass::BandpassMask;
use crate::error::QcsfError;

/// A 5x5 binary glyph: `true` is ink, `false` is background.
pub type Bitmap = [[bool; 5]; 5];

/// Default bandpass center frequency for template filtering, in cycles
/// per letter.
pub const DEFAULT_FC: f64 = 4.0;
/// Default bandpass full bandwidth, in octaves.
pub const DEFAULT_DELTA_OCT: f64 = 1.0;

/// A filtered optotype template: an `n x n` signed image in `[-1, 1]`,
/// mean approximately zero.
#[derive(Debug, Clone)]
pub struct Template {
    pub n: usize,
    pub pixels: Vec<f64>,
}

impl Template {
    /// Bilinearly samples the template at normalized coordinates
    /// `(u, v) in [0, 1) x [0, 1)`.
    pub fn sample_bilinear(&self, u: f64, v: f64) -> f64 {
        let n = self.n as f64;
        let x = (u * n).clamp(0.0, n - 1.0001);
        let y = (v * n).clamp(0.0, n - 1.0001);
        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(self.n - 1);
        let y1 = (y0 + 1).min(self.n - 1);
        let fx = x - x0 as f64;
        let fy = y - y0 as f64;

        let p00 = self.pixels[y0 * self.n + x0];
        let p10 = self.pixels[y0 * self.n + x1];
        let p01 = self.pixels[y1 * self.n + x0];
        let p11 = self.pixels[y1 * self.n + x1];

        let top = p00 * (1.0 - fx) + p10 * fx;
        let bottom = p01 * (1.0 - fx) + p11 * fx;
        top * (1.0 - fy) + bottom * fy
    }
}

/// Rasterizes a 5x5 bitmap onto an `n x n` signed canvas: ink pixels map
/// to -0.5, background to +0.5, with stroke width `n * 0.75 / 5` so the
/// glyph spans 75% of the image.
pub fn rasterize_bitmap(bitmap: &Bitmap, n: usize) -> Vec<f64> {
    let cell = n as f64 * 0.75 / 5.0;
    let span = cell * 5.0;
    let offset = (n as f64 - span) / 2.0;

    let mut out = vec![0.5; n * n];
    for py in 0..n {
        let local_y = py as f64 - offset;
        if local_y < 0.0 || local_y >= span {
            continue;
        }
        let row = (local_y / cell) as usize;
        for px in 0..n {
            let local_x = px as f64 - offset;
            if local_x < 0.0 || local_x >= span {
                continue;
            }
            let col = (local_x / cell) as usize;
            if bitmap[row.min(4)][col.min(4)] {
                out[py * n + px] = -0.5;
            }
        }
    }
    out
}

/// Rasterizes and bandpass-filters a bitmap into a final `Template`.
pub fn build_template(bitmap: &Bitmap, n: usize, mask: &BandpassMask) -> Result<Template, QcsfError> {
    let signed = rasterize_bitmap(bitmap, n);
    let filtered = mask.apply(&signed)?;
    Ok(Template { n, pixels: filtered })
}

/// Rotates a 5x5 bitmap 90 degrees clockwise.
pub fn rotate_cw(bitmap: &Bitmap) -> Bitmap {
    let mut out = [[false; 5]; 5];
    for r in 0..5 {
        for c in 0..5 {
            out[c][4 - r] = bitmap[r][c];
        }
    }
    out
}
