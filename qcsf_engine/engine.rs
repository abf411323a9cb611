//! The Bayesian adaptive qCSF engine: parameter/stimulus grids, the
//! precomputed likelihood matrix, one-step-ahead stimulus selection,
//! posterior update, and derived CSF summaries.
//!
//! Single-threaded, cooperative: every method here runs synchronously to
//! completion. See spec.md §5 for the full concurrency contract.

use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::QcsfError;
use crate::numeric::logspace;
use crate::qcsf_engine::csf_model::CsfModel;
use crate::qcsf_engine::grid::{
    build_param_grid, build_stimulus_grid, default_bandwidth_values, default_peak_freq_values,
    default_peak_gain_values, default_stim_freqs, default_stim_log_contrasts, default_truncation_values,
};
use crate::qcsf_engine::likelihood::build_likelihood_matrix;
use crate::types::{CsfPoint, ParamPoint, StimulusChoice, TrialRecord};

/// Number of evaluated frequencies reported per `csf_curve` call.
const CSF_CURVE_POINTS: usize = 120;
/// Trapezoidal panel count for `compute_aulcsf`.
const AULCSF_PANELS: usize = 500;

/// Construction-time configuration for a `QcsfEngine`. Defaults match
/// spec.md §6/§7.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub num_afc: u8,
    pub alpha: f64,
    pub lapse: f64,
    pub false_alarm_rate: f64,
    pub csf_model: CsfModel,
    pub peak_gain_values: Vec<f64>,
    pub peak_freq_values: Vec<f64>,
    pub bandwidth_values: Vec<f64>,
    pub truncation_values: Vec<f64>,
    pub stim_freqs: Vec<f64>,
    pub stim_log_contrasts: Vec<f64>,
    pub robust_likelihood_mix: f64,
    /// Optional boundary weighting `sigma` (log-contrast units). `None`
    /// disables the boundary weight entirely.
    pub boundary_sigma_log_c: Option<f64>,
    /// Applies a 1.35x weight to stimuli with `freq_cpd in [1, 5]`.
    pub low_mid_freq_boost: bool,
    /// Rejects parameter points whose `logS(60 cpd) > 0`.
    pub high_cutoff_prune: bool,
    /// RNG seed for reproducible top-k tie-breaking.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_afc: 4,
            alpha: 3.5,
            lapse: 0.04,
            false_alarm_rate: 0.01,
            csf_model: CsfModel::TruncatedLogParabola,
            peak_gain_values: default_peak_gain_values(),
            peak_freq_values: default_peak_freq_values(),
            bandwidth_values: default_bandwidth_values(),
            truncation_values: default_truncation_values(),
            stim_freqs: default_stim_freqs(),
            stim_log_contrasts: default_stim_log_contrasts(),
            robust_likelihood_mix: 0.03,
            boundary_sigma_log_c: None,
            low_mid_freq_boost: false,
            high_cutoff_prune: false,
            seed: 0,
        }
    }
}

/// The Bayesian adaptive engine. Owns the parameter grid, stimulus grid,
/// likelihood matrix, posterior, and trial history exclusively.
pub struct QcsfEngine {
    params: Vec<ParamPoint>,
    stimuli: Vec<crate::types::Stimulus>,
    likelihood: Array2<f64>,
    posterior: Vec<f64>,
    history: Vec<TrialRecord>,
    trial_count: u32,
    model: CsfModel,
    robust_mix: f64,
    boundary_sigma_log_c: Option<f64>,
    low_mid_freq_boost: bool,
    rng: ChaCha8Rng,
    entropy_scratch: Vec<f64>,
    p_bar_scratch: Vec<f64>,
    warnings: Vec<String>,
}

impl QcsfEngine {
    /// Constructs the engine: builds `G_Theta`, `G_S`, precomputes `M`,
    /// and initializes a uniform posterior.
    pub fn new(config: EngineConfig) -> Result<Self, QcsfError> {
        let mut params = build_param_grid(
            &config.peak_gain_values,
            &config.peak_freq_values,
            &config.bandwidth_values,
            &config.truncation_values,
        )?;

        if config.high_cutoff_prune {
            params.retain(|&theta| config.csf_model.evaluate(60.0, theta) <= 0.0);
            if params.is_empty() {
                return Err(QcsfError::Configuration {
                    message: "high_cutoff_prune removed every parameter grid point".to_string(),
                });
            }
        }

        let stimuli = build_stimulus_grid(&config.stim_freqs, &config.stim_log_contrasts)?;

        let gamma = if config.num_afc >= 2 {
            1.0 / config.num_afc as f64
        } else {
            config.false_alarm_rate
        };

        let likelihood =
            build_likelihood_matrix(&params, &stimuli, config.csf_model, config.alpha, gamma, config.lapse);

        let uniform_mass = 1.0 / params.len() as f64;
        let posterior = vec![uniform_mass; params.len()];
        let stim_count = stimuli.len();

        Ok(Self {
            params,
            stimuli,
            likelihood,
            posterior,
            history: Vec::new(),
            trial_count: 0,
            model: config.csf_model,
            robust_mix: config.robust_likelihood_mix,
            boundary_sigma_log_c: config.boundary_sigma_log_c,
            low_mid_freq_boost: config.low_mid_freq_boost,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            entropy_scratch: vec![0.0; stim_count],
            p_bar_scratch: vec![0.0; stim_count],
            warnings: Vec::new(),
        })
    }

    pub fn param_grid(&self) -> &[ParamPoint] {
        &self.params
    }

    pub fn stimulus_grid(&self) -> &[crate::types::Stimulus] {
        &self.stimuli
    }

    pub fn trial_count(&self) -> u32 {
        self.trial_count
    }

    pub fn history(&self) -> &[TrialRecord] {
        &self.history
    }

    pub fn posterior(&self) -> &[f64] {
        &self.posterior
    }

    /// Non-fatal warnings accumulated since the last `clear_warnings`
    /// call (numerical degeneracy recoveries, see spec.md §7).
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn clear_warnings(&mut self) {
        self.warnings.clear();
    }

    /// One-step-ahead expected-entropy-minimizing stimulus selection.
    #[cfg_attr(feature = "trace-engine", tracing::instrument(skip(self), fields(trial = self.trial_count)))]
    pub fn select_stimulus(&mut self) -> Result<StimulusChoice, QcsfError> {
        let theta_hat = if self.boundary_sigma_log_c.is_some() {
            Some(self.expected_estimate())
        } else {
            None
        };

        for s in 0..self.stimuli.len() {
            let mut p_bar = 0.0;
            for h in 0..self.params.len() {
                p_bar += self.posterior[h] * self.likelihood[[h, s]];
            }
            self.p_bar_scratch[s] = p_bar;

            let mut h_c = 0.0;
            if p_bar > 1e-30 {
                for h in 0..self.params.len() {
                    let num = self.posterior[h] * self.likelihood[[h, s]];
                    if num > 1e-30 {
                        let p = num / p_bar;
                        h_c -= p * p.log2();
                    }
                }
            }

            let mut h_i = 0.0;
            let q_bar = 1.0 - p_bar;
            if q_bar > 1e-30 {
                for h in 0..self.params.len() {
                    let num = self.posterior[h] * (1.0 - self.likelihood[[h, s]]);
                    if num > 1e-30 {
                        let p = num / q_bar;
                        h_i -= p * p.log2();
                    }
                }
            }

            let mut e = p_bar * h_c + q_bar * h_i;

            if let Some(sigma_b) = self.boundary_sigma_log_c {
                let theta_hat = theta_hat.expect("computed above when boundary weighting is enabled");
                let stim = self.stimuli[s];
                let log_s_hat = self.model.evaluate(stim.freq_cpd, theta_hat);
                let target = -log_s_hat;
                let z = (stim.log_contrast - target) / sigma_b;
                let w_b = (-0.5 * z * z).exp();
                e *= 1.0 + w_b;
            }
            if self.low_mid_freq_boost {
                let freq = self.stimuli[s].freq_cpd;
                if (1.0..=5.0).contains(&freq) {
                    e *= 1.35;
                }
            }

            self.entropy_scratch[s] = e;
        }

        let finite_count = self.entropy_scratch.iter().filter(|e| e.is_finite()).count();

        let stim_index = if finite_count == 0 {
            let trial = self.trial_count;
            self.warnings.push(format!(
                "trial {trial}: all expected-entropy values non-finite, falling back to max p_bar"
            ));
            log::warn!("qcsf: all E[s] non-finite at trial {trial}, falling back to max p_bar");
            let mut best = 0usize;
            for s in 1..self.p_bar_scratch.len() {
                if self.p_bar_scratch[s] > self.p_bar_scratch[best] {
                    best = s;
                }
            }
            best
        } else {
            let k = if self.trial_count < 8 {
                5usize
            } else {
                ((0.1 * self.stimuli.len() as f64).ceil() as usize).max(1)
            }
            .min(finite_count);

            let mut ranked: Vec<usize> = (0..self.entropy_scratch.len())
                .filter(|&s| self.entropy_scratch[s].is_finite())
                .collect();
            ranked.sort_by(|&a, &b| self.entropy_scratch[a].partial_cmp(&self.entropy_scratch[b]).unwrap());
            let top_k = &ranked[..k];
            top_k[self.rng.gen_range(0..k)]
        };

        let stim = self.stimuli[stim_index];
        Ok(StimulusChoice {
            freq_cpd: stim.freq_cpd,
            contrast: stim.contrast(),
            log_contrast: stim.log_contrast,
            stim_index,
        })
    }

    /// Updates the posterior given the observed correctness of the
    /// response to stimulus `stim_index`.
    #[cfg_attr(feature = "trace-engine", tracing::instrument(skip(self), fields(trial = self.trial_count, stim_index, correct)))]
    pub fn update(&mut self, stim_index: usize, correct: bool) -> Result<(), QcsfError> {
        if stim_index >= self.stimuli.len() {
            return Err(QcsfError::Precondition {
                message: format!("stim_index {stim_index} out of range (grid has {} stimuli)", self.stimuli.len()),
            });
        }

        let mut total = 0.0;
        for h in 0..self.params.len() {
            let m = self.likelihood[[h, stim_index]];
            let raw = if correct { m } else { 1.0 - m };
            let obs = (1.0 - self.robust_mix) * raw + self.robust_mix * 0.5;
            self.posterior[h] *= obs;
            total += self.posterior[h];
        }

        if total > 0.0 {
            for h in 0..self.params.len() {
                self.posterior[h] /= total;
            }
        } else {
            let trial = self.trial_count;
            self.warnings.push(format!("trial {trial}: posterior mass summed to zero, leaving posterior unchanged"));
            log::warn!("qcsf: posterior collapsed to zero mass at trial {trial}");
        }

        self.trial_count += 1;
        self.history.push(TrialRecord { trial: self.trial_count, stim_index, correct });
        Ok(())
    }

    /// Posterior-mode estimate (argmax mass).
    pub fn estimate(&self) -> ParamPoint {
        let mut best = 0usize;
        for h in 1..self.posterior.len() {
            if self.posterior[h] > self.posterior[best] {
                best = h;
            }
        }
        self.params[best]
    }

    /// Posterior-mean estimate, with `f` averaged in log10 space.
    pub fn expected_estimate(&self) -> ParamPoint {
        let mut g = 0.0;
        let mut log_f = 0.0;
        let mut b = 0.0;
        let mut d = 0.0;
        for (h, &theta) in self.params.iter().enumerate() {
            let w = self.posterior[h];
            g += w * theta.g;
            log_f += w * theta.f.log10();
            b += w * theta.b;
            d += w * theta.d;
        }
        ParamPoint { g, f: 10f64.powf(log_f), b, d }
    }

    /// `logS(freq; theta)` per the engine's configured CSF model.
    pub fn evaluate_csf(&self, freq_cpd: f64, theta: ParamPoint) -> f64 {
        self.model.evaluate(freq_cpd, theta)
    }

    /// Trapezoidal-integrated Area Under the Log Contrast Sensitivity
    /// Function, over `log10 freq in [log10 0.5, log10 36]`, 500 panels.
    pub fn compute_aulcsf(&self, theta: ParamPoint) -> f64 {
        let lo = 0.5f64.log10();
        let hi = 36f64.log10();
        let h = (hi - lo) / AULCSF_PANELS as f64;
        let mut sum = 0.0;
        for i in 0..=AULCSF_PANELS {
            let log_freq = lo + h * i as f64;
            let freq = 10f64.powf(log_freq);
            let value = self.model.evaluate(freq, theta).max(0.0);
            let weight = if i == 0 || i == AULCSF_PANELS { 0.5 } else { 1.0 };
            sum += weight * value;
        }
        sum * h
    }

    /// At least 100 log-spaced `{freq, logS}` samples over
    /// `f in [10^-0.3, 10^1.7]` cpd, for downstream plotting.
    pub fn csf_curve(&self, theta: ParamPoint) -> Vec<CsfPoint> {
        logspace(-0.3, 1.7, CSF_CURVE_POINTS)
            .into_iter()
            .map(|freq_cpd| CsfPoint { freq_cpd, log_sensitivity: self.model.evaluate(freq_cpd, theta) })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stimulus;

    fn oracle_response(engine: &QcsfEngine, theta_true: ParamPoint, stim: Stimulus, rng: &mut impl Rng) -> bool {
        let log_s = engine.model.evaluate(stim.freq_cpd, theta_true);
        let x = log_s - (-stim.log_contrast);
        let psi = 1.0 / (1.0 + (-engine.likelihood_alpha_for_test() * x).exp());
        let gamma = 0.25;
        let lambda = 0.04;
        let p_correct = (gamma + (1.0 - gamma - lambda) * psi).clamp(0.001, 0.999);
        rng.gen::<f64>() < p_correct
    }

    impl QcsfEngine {
        fn likelihood_alpha_for_test(&self) -> f64 {
            3.5
        }
    }

    #[test]
    fn single_point_grid_converges_to_certainty() {
        let theta0 = ParamPoint { g: 2.0, f: 4.0, b: 1.3, d: 1.8 };
        let config = EngineConfig {
            peak_gain_values: vec![theta0.g],
            peak_freq_values: vec![theta0.f],
            bandwidth_values: vec![theta0.b],
            truncation_values: vec![theta0.d],
            ..Default::default()
        };
        let mut engine = QcsfEngine::new(config).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..50 {
            let choice = engine.select_stimulus().unwrap();
            let stim = engine.stimuli[choice.stim_index];
            let correct = oracle_response(&engine, theta0, stim, &mut rng);
            engine.update(choice.stim_index, correct).unwrap();
        }

        assert!((engine.posterior[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn coarse_grid_oracle_recovers_true_point() {
        let config = EngineConfig {
            peak_gain_values: vec![1.0, 2.5],
            peak_freq_values: vec![2.0, 8.0],
            bandwidth_values: vec![1.0, 3.0],
            truncation_values: vec![1.0, 2.0],
            seed: 7,
            ..Default::default()
        };
        let theta_true = ParamPoint { g: 2.5, f: 8.0, b: 1.0, d: 2.0 };
        let mut engine = QcsfEngine::new(config).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1234);

        for _ in 0..50 {
            let choice = engine.select_stimulus().unwrap();
            let stim = engine.stimuli[choice.stim_index];
            let correct = oracle_response(&engine, theta_true, stim, &mut rng);
            engine.update(choice.stim_index, correct).unwrap();
        }

        let map = engine.estimate();
        assert_eq!(map, theta_true);
    }

    #[test]
    fn entropy_drops_after_updates_from_uniform_prior() {
        let config = EngineConfig {
            peak_gain_values: linspace_test(0.5, 2.8, 5),
            peak_freq_values: linspace_test(0.5, 18.0, 5),
            bandwidth_values: linspace_test(0.8, 6.0, 5),
            truncation_values: linspace_test(0.0, 2.6, 1),
            seed: 99,
            ..Default::default()
        };
        let theta_true = ParamPoint { g: 2.0, f: 4.0, b: 1.3, d: 1.3 };
        let mut engine = QcsfEngine::new(config).unwrap();
        assert!(engine.posterior.len() >= 100);

        let initial_entropy = shannon_entropy(&engine.posterior);
        let mut rng = ChaCha8Rng::seed_from_u64(555);
        for _ in 0..20 {
            let choice = engine.select_stimulus().unwrap();
            let stim = engine.stimuli[choice.stim_index];
            let correct = oracle_response(&engine, theta_true, stim, &mut rng);
            engine.update(choice.stim_index, correct).unwrap();
        }
        let final_entropy = shannon_entropy(&engine.posterior);
        assert!(final_entropy <= initial_entropy * 0.5, "initial={initial_entropy} final={final_entropy}");
    }

    fn linspace_test(lo: f64, hi: f64, n: usize) -> Vec<f64> {
        crate::numeric::linspace(lo, hi, n)
    }

    fn shannon_entropy(p: &[f64]) -> f64 {
        -p.iter().filter(|&&x| x > 1e-300).map(|&x| x * x.log2()).sum::<f64>()
    }

    #[test]
    fn posterior_stays_a_probability_measure() {
        let mut engine = QcsfEngine::new(EngineConfig::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..30 {
            let choice = engine.select_stimulus().unwrap();
            let correct = rng.gen_bool(0.5);
            engine.update(choice.stim_index, correct).unwrap();
            let sum: f64 = engine.posterior.iter().sum();
            assert!((sum - 1.0).abs() <= 1e-9, "sum={sum}");
            assert!(engine.posterior.iter().all(|&p| p >= 0.0));
        }
    }

    #[test]
    fn rejects_out_of_range_stim_index() {
        let mut engine = QcsfEngine::new(EngineConfig::default()).unwrap();
        let n = engine.stimuli.len();
        assert!(engine.update(n, true).is_err());
    }

    #[test]
    fn aulcsf_is_non_negative_and_in_expected_range() {
        let engine = QcsfEngine::new(EngineConfig::default()).unwrap();
        let theta = ParamPoint { g: 2.0, f: 4.0, b: 1.3, d: 1.8 };
        let value = engine.compute_aulcsf(theta);
        assert!(value >= 0.0);
        assert!(value >= 1.5 && value <= 2.1, "value={value}");
    }

    #[test]
    fn csf_curve_has_at_least_100_points() {
        let engine = QcsfEngine::new(EngineConfig::default()).unwrap();
        let theta = ParamPoint { g: 2.0, f: 4.0, b: 1.3, d: 1.8 };
        let curve = engine.csf_curve(theta);
        assert!(curve.len() >= 100);
    }
}
