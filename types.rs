//! Plain data types shared between the grid, engine, and result derivation.

use serde::{Deserialize, Serialize};

/// A point `Θ = (g, f, b, d)` in the CSF parameter grid.
///
/// - `g`: peak log10 sensitivity
/// - `f`: peak (knee) spatial frequency, cycles per degree
/// - `b`: bandwidth / curvature control
/// - `d`: high-frequency truncation / steepening
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamPoint {
    pub g: f64,
    pub f: f64,
    pub b: f64,
    pub d: f64,
}

/// A point `(freq_cpd, log10_contrast)` in the stimulus grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stimulus {
    pub freq_cpd: f64,
    pub log_contrast: f64,
}

impl Stimulus {
    pub fn contrast(&self) -> f64 {
        10f64.powf(self.log_contrast)
    }
}

/// Chosen stimulus returned by `QcsfEngine::select_stimulus`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StimulusChoice {
    pub freq_cpd: f64,
    pub contrast: f64,
    pub log_contrast: f64,
    pub stim_index: usize,
}

/// One trial of observed history. Append-only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial: u32,
    pub stim_index: usize,
    pub correct: bool,
}

/// One sampled point of a CSF curve, for downstream plotting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CsfPoint {
    pub freq_cpd: f64,
    pub log_sensitivity: f64,
}
