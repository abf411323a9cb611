//! Small numeric helpers shared across the grid, CSF model, and renderers.
//!
//! Nothing here does anything clever; it exists so the grid construction and
//! the CSF model don't each reimplement linspace/logspace/clamp slightly
//! differently.

/// `n` linearly spaced values from `start` to `end`, inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

/// `n` log10-spaced values from `10^start_exp` to `10^end_exp`, inclusive.
pub fn logspace(start_exp: f64, end_exp: f64, n: usize) -> Vec<f64> {
    linspace(start_exp, end_exp, n)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect()
}

/// Clamps `x` into `[lo, hi]`.
pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    x.max(lo).min(hi)
}

/// Minimum spatial frequency accepted by the CSF model, per the model
/// contract: `logS` must be computable for any `freq > 0`; frequencies are
/// clamped to this floor before taking a log.
pub const MIN_FREQ_CPD: f64 = 0.05;

/// `log10` of `freq`, with `freq` first clamped to `MIN_FREQ_CPD`.
pub fn log10_clamped(freq: f64) -> f64 {
    freq.max(MIN_FREQ_CPD).log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_endpoints() {
        let v = linspace(1.0, 5.0, 5);
        assert_eq!(v, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn linspace_single_point() {
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
    }

    #[test]
    fn logspace_matches_powers_of_ten() {
        let v = logspace(-1.0, 1.0, 3);
        assert!((v[0] - 0.1).abs() < 1e-12);
        assert!((v[1] - 1.0).abs() < 1e-12);
        assert!((v[2] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(15.0, 0.0, 10.0), 10.0);
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
    }

    #[test]
    fn log10_clamped_floors_at_min_freq() {
        assert!((log10_clamped(0.0) - MIN_FREQ_CPD.log10()).abs() < 1e-12);
        assert!((log10_clamped(100.0) - 2.0).abs() < 1e-12);
    }
}
