//! Parameter grid `G_Θ` and stimulus grid `G_S` construction.

use crate::error::QcsfError;
use crate::numeric::{linspace, logspace};
use crate::types::{ParamPoint, Stimulus};

/// Hard ceiling on parameter grid size (spec.md §3: "≤ 5000").
pub const MAX_PARAM_GRID_POINTS: usize = 5000;

/// Default peak log10-sensitivity values, `g in [0.5, 2.8]`, 10 points.
pub fn default_peak_gain_values() -> Vec<f64> {
    linspace(0.5, 2.8, 10)
}

/// Default peak (knee) spatial frequency values, `f in [0.5, 18]` cpd,
/// log-spaced (the knee is naturally a log-frequency quantity), 10 points.
pub fn default_peak_freq_values() -> Vec<f64> {
    logspace(0.5f64.log10(), 18f64.log10(), 10)
}

/// Default bandwidth values, `b in [0.8, 6]`, 5 points.
pub fn default_bandwidth_values() -> Vec<f64> {
    linspace(0.8, 6.0, 5)
}

/// Default truncation values, `d in [0, 2.6]`, 5 points.
pub fn default_truncation_values() -> Vec<f64> {
    linspace(0.0, 2.6, 5)
}

/// Default stimulus spatial frequencies, log-spaced over `[0.5, 24]` cpd.
pub fn default_stim_freqs() -> Vec<f64> {
    logspace(0.5f64.log10(), 24f64.log10(), 15)
}

/// Default stimulus log10-contrasts, linearly spaced over `[-3, 0]`.
pub fn default_stim_log_contrasts() -> Vec<f64> {
    linspace(-3.0, 0.0, 30)
}

/// Builds the Cartesian-product parameter grid `G_Θ`.
pub fn build_param_grid(
    peak_gain: &[f64],
    peak_freq: &[f64],
    bandwidth: &[f64],
    truncation: &[f64],
) -> Result<Vec<ParamPoint>, QcsfError> {
    if peak_gain.is_empty() || peak_freq.is_empty() || bandwidth.is_empty() || truncation.is_empty() {
        return Err(QcsfError::Configuration {
            message: "parameter grid value lists must be non-empty".to_string(),
        });
    }
    let total = peak_gain.len() * peak_freq.len() * bandwidth.len() * truncation.len();
    if total > MAX_PARAM_GRID_POINTS {
        return Err(QcsfError::Configuration {
            message: format!("parameter grid has {total} points, exceeds cap of {MAX_PARAM_GRID_POINTS}"),
        });
    }

    let mut points = Vec::with_capacity(total);
    for &g in peak_gain {
        for &f in peak_freq {
            for &b in bandwidth {
                for &d in truncation {
                    points.push(ParamPoint { g, f, b, d });
                }
            }
        }
    }
    Ok(points)
}

/// Builds the Cartesian-product stimulus grid `G_S`.
pub fn build_stimulus_grid(freqs: &[f64], log_contrasts: &[f64]) -> Result<Vec<Stimulus>, QcsfError> {
    if freqs.is_empty() || log_contrasts.is_empty() {
        return Err(QcsfError::Configuration {
            message: "stimulus grid value lists must be non-empty".to_string(),
        });
    }
    let mut points = Vec::with_capacity(freqs.len() * log_contrasts.len());
    for &freq_cpd in freqs {
        for &log_contrast in log_contrasts {
            points.push(Stimulus { freq_cpd, log_contrast });
        }
    }
    Ok(points)
}
