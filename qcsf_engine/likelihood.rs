//! Precomputed psychometric likelihood matrix `M[h,s] = Pr(correct | Theta_h, s)`.

use ndarray::Array2;

use crate::numeric::clamp;
use crate::qcsf_engine::csf_model::CsfModel;
use crate::types::{ParamPoint, Stimulus};

/// Likelihood bounds per spec.md §3/§8: never exactly 0 or 1, so a single
/// incorrect/correct response never collapses a point's posterior mass to
/// zero outright.
pub const LIKELIHOOD_MIN: f64 = 0.001;
pub const LIKELIHOOD_MAX: f64 = 0.999;

/// Builds the `|G_Θ| x |G_S|` likelihood matrix. Computed once at engine
/// construction; never mutated afterward.
pub fn build_likelihood_matrix(
    params: &[ParamPoint],
    stimuli: &[Stimulus],
    model: CsfModel,
    alpha: f64,
    gamma: f64,
    lambda: f64,
) -> Array2<f64> {
    let mut matrix = Array2::<f64>::zeros((params.len(), stimuli.len()));
    for (h, &theta) in params.iter().enumerate() {
        for (s, &stim) in stimuli.iter().enumerate() {
            let log_s = model.evaluate(stim.freq_cpd, theta);
            let x = log_s - (-stim.log_contrast);
            let psi = 1.0 / (1.0 + (-alpha * x).exp());
            let m = clamp(gamma + (1.0 - gamma - lambda) * psi, LIKELIHOOD_MIN, LIKELIHOOD_MAX);
            matrix[[h, s]] = m;
        }
    }
    matrix
}
