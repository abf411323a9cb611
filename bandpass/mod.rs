//! Raised-cosine annular bandpass filter in 2D frequency space.
//!
//! Builds a mask once per `(n, f_c, delta_oct)` configuration and applies
//! it via forward FFT, bin-wise multiply, inverse FFT, then peak-normalizes
//! the real part back into `[-1, 1]`.

use std::f64::consts::PI;

use crate::error::QcsfError;
use crate::fft::fft2d;

/// A raised-cosine annular mask, precomputed for one `(n, f_c, delta_oct)`
/// configuration and reusable across every template filtered at that
/// configuration.
#[derive(Debug, Clone)]
pub struct BandpassMask {
    n: usize,
    mask: Vec<f64>,
}

impl BandpassMask {
    /// Builds the mask. `f_c` is the center frequency in cycles per
    /// object (the `n x n` image being filtered); `delta_oct` is the
    /// full bandwidth in octaves.
    pub fn build(n: usize, f_c: f64, delta_oct: f64) -> Self {
        let mut mask = vec![0.0; n * n];
        let half = delta_oct / 2.0;
        for u in 0..n {
            let fx = if u <= n / 2 { u as f64 } else { u as f64 - n as f64 };
            for v in 0..n {
                let fy = if v <= n / 2 { v as f64 } else { v as f64 - n as f64 };
                let rho = (fx * fx + fy * fy).sqrt();
                let h = if rho == 0.0 {
                    0.0
                } else {
                    let delta = (rho / f_c).log2().abs();
                    if delta <= half {
                        0.5 * (1.0 + (PI * delta / half).cos())
                    } else {
                        0.0
                    }
                };
                mask[u * n + v] = h;
            }
        }
        Self { n, mask }
    }

    /// Applies this mask to a signed, mean-approximately-zero image of
    /// side `self.n`, returning the peak-normalized, real-valued result.
    pub fn apply(&self, x: &[f64]) -> Result<Vec<f64>, QcsfError> {
        let n = self.n;
        if x.len() != n * n {
            return Err(QcsfError::Configuration {
                message: format!("bandpass input length {} != n*n ({})", x.len(), n * n),
            });
        }

        let mut re = x.to_vec();
        let mut im = vec![0.0; n * n];

        fft2d(&mut re, &mut im, n, false)?;
        for i in 0..re.len() {
            re[i] *= self.mask[i];
            im[i] *= self.mask[i];
        }
        fft2d(&mut re, &mut im, n, true)?;

        let peak = re.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        if peak > 0.0 {
            for v in re.iter_mut() {
                *v /= peak;
            }
        }
        Ok(re)
    }
}

/// Convenience one-shot filter: build the mask and apply it once. Prefer
/// `BandpassMask::build` + `apply` when filtering many images at the same
/// `(n, f_c, delta_oct)` configuration, e.g. the optotype template set.
pub fn apply_bandpass_filter(x: &[f64], n: usize, f_c: f64, delta_oct: f64) -> Result<Vec<f64>, QcsfError> {
    BandpassMask::build(n, f_c, delta_oct).apply(x)
}
