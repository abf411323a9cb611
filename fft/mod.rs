//! In-place 2D radix-2 Cooley-Tukey FFT.
//!
//! Operates on two equal-length `f64` slices (`re`, `im`) of length `N*N`
//! with `N` a power of two: a 1D radix-2 decimation-in-time FFT runs on
//! every row, then every column, in place. `invert` flips the sign of the
//! twiddle exponent and divides each 1D pass by `N`, so a 2D inverse
//! divides by `N*N` overall.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::error::QcsfError;

/// Runs the in-place 2D FFT (or inverse, if `invert`) on `re`/`im`.
///
/// `re.len()` and `im.len()` must both equal `n * n`, and `n` must be a
/// power of two. Allocates one length-`n` scratch buffer, reused across
/// every row and every column.
pub fn fft2d(re: &mut [f64], im: &mut [f64], n: usize, invert: bool) -> Result<(), QcsfError> {
    if n == 0 || (n & (n - 1)) != 0 {
        return Err(QcsfError::Configuration {
            message: format!("FFT size must be a power of two, got {n}"),
        });
    }
    if re.len() != n * n || im.len() != n * n {
        return Err(QcsfError::Configuration {
            message: format!(
                "FFT buffers must have length {} (n*n), got re={} im={}",
                n * n,
                re.len(),
                im.len()
            ),
        });
    }

    let mut scratch = vec![Complex64::new(0.0, 0.0); n];

    // Row pass.
    for r in 0..n {
        let base = r * n;
        for c in 0..n {
            scratch[c] = Complex64::new(re[base + c], im[base + c]);
        }
        fft1d(&mut scratch, invert);
        for c in 0..n {
            re[base + c] = scratch[c].re;
            im[base + c] = scratch[c].im;
        }
    }

    // Column pass.
    for c in 0..n {
        for r in 0..n {
            scratch[r] = Complex64::new(re[r * n + c], im[r * n + c]);
        }
        fft1d(&mut scratch, invert);
        for r in 0..n {
            re[r * n + c] = scratch[r].re;
            im[r * n + c] = scratch[r].im;
        }
    }

    Ok(())
}

/// In-place 1D radix-2 decimation-in-time FFT on a power-of-two-length
/// buffer: bit-reversal permutation, then butterflies with per-stage
/// twiddle factors.
fn fft1d(buf: &mut [Complex64], invert: bool) {
    let n = buf.len();
    if n <= 1 {
        return;
    }

    // Bit-reversal permutation.
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            buf.swap(i, j);
        }
    }

    // Butterflies, doubling the span each stage.
    let mut len = 2usize;
    while len <= n {
        let ang = (if invert { 1.0 } else { -1.0 }) * 2.0 * PI / len as f64;
        let wlen = Complex64::new(ang.cos(), ang.sin());
        let mut i = 0;
        while i < n {
            let mut w = Complex64::new(1.0, 0.0);
            for k in 0..len / 2 {
                let u = buf[i + k];
                let v = buf[i + k + len / 2] * w;
                buf[i + k] = u + v;
                buf[i + k + len / 2] = u - v;
                w *= wlen;
            }
            i += len;
        }
        len <<= 1;
    }

    if invert {
        let scale = 1.0 / n as f64;
        for x in buf.iter_mut() {
            *x *= scale;
        }
    }
}
