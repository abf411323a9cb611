//! Result derivation: plausibility guard, AULCSF rank bucketing, Snellen
//! acuity prediction, and landmark pass/fail evaluation.

use serde::{Deserialize, Serialize};

use crate::numeric::logspace;
use crate::qcsf_engine::QcsfEngine;
use crate::types::{ParamPoint, TrialRecord};

/// One `(name, frequency, required sensitivity)` check in the landmark
/// table. The defaults here are a documented placeholder scale, not a
/// clinically validated norm table — see DESIGN.md.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Landmark {
    pub name: String,
    pub freq_cpd: f64,
    pub required_sensitivity: f64,
}

/// Outcome of one landmark check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkResult {
    pub name: String,
    pub freq_cpd: f64,
    pub required_sensitivity: f64,
    pub yours: f64,
    pub pass: bool,
}

/// Static landmark table used by `derive` unless the caller supplies
/// its own via `ResultConfig::landmarks`.
pub fn default_landmarks() -> Vec<Landmark> {
    vec![
        Landmark { name: "1 cpd (low spatial frequency)".to_string(), freq_cpd: 1.0, required_sensitivity: 50.0 },
        Landmark { name: "4 cpd (peak sensitivity range)".to_string(), freq_cpd: 4.0, required_sensitivity: 80.0 },
        Landmark { name: "8 cpd".to_string(), freq_cpd: 8.0, required_sensitivity: 25.0 },
        Landmark { name: "16 cpd (acuity range)".to_string(), freq_cpd: 16.0, required_sensitivity: 4.0 },
        Landmark { name: "24 cpd (high acuity)".to_string(), freq_cpd: 24.0, required_sensitivity: 1.5 },
    ]
}

/// Configuration for `derive`.
#[derive(Debug, Clone)]
pub struct ResultConfig {
    /// Whether to apply the heuristic plausibility guard of spec.md
    /// §4.8. Toggleable per spec's explicit product-decision note.
    pub apply_plausibility_guard: bool,
    pub landmarks: Vec<Landmark>,
}

impl Default for ResultConfig {
    fn default() -> Self {
        Self { apply_plausibility_guard: true, landmarks: default_landmarks() }
    }
}

/// Fully derived session result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    pub theta: ParamPoint,
    pub aulcsf: f64,
    pub rank: String,
    pub snellen: String,
    pub landmarks: Vec<LandmarkResult>,
    /// Human-readable descriptions of any plausibility-guard adjustments
    /// that were applied.
    pub guard_applied: Vec<String>,
    pub history: Vec<TrialRecord>,
}

/// Derives the final session result from a completed (or in-progress)
/// engine, using its posterior-mean estimate.
pub fn derive(engine: &QcsfEngine, config: &ResultConfig) -> SessionResult {
    let mut theta = engine.expected_estimate();
    let mut guard_applied = Vec::new();

    if config.apply_plausibility_guard {
        apply_plausibility_guard(engine, &mut theta, &mut guard_applied);
    }

    let aulcsf = engine.compute_aulcsf(theta);
    if !aulcsf.is_finite() {
        return SessionResult {
            theta,
            aulcsf: 0.0,
            rank: "ERROR".to_string(),
            snellen: String::new(),
            landmarks: Vec::new(),
            guard_applied,
            history: engine.history().to_vec(),
        };
    }

    let rank = rank_from_aulcsf(aulcsf).to_string();
    let cutoff = find_cutoff_freq(engine, theta).clamp(f64::MIN_POSITIVE, 60.0);
    let denominator = (20.0 * 30.0 / cutoff).round() as i64;
    let snellen = format!("20/{denominator}");

    let landmarks = config
        .landmarks
        .iter()
        .map(|l| {
            let yours = 10f64.powf(engine.evaluate_csf(l.freq_cpd, theta));
            LandmarkResult {
                name: l.name.clone(),
                freq_cpd: l.freq_cpd,
                required_sensitivity: l.required_sensitivity,
                yours,
                pass: yours >= l.required_sensitivity,
            }
        })
        .collect();

    SessionResult { theta, aulcsf, rank, snellen, landmarks, guard_applied, history: engine.history().to_vec() }
}

fn apply_plausibility_guard(engine: &QcsfEngine, theta: &mut ParamPoint, guard_applied: &mut Vec<String>) {
    let low_freq_trials = engine
        .history()
        .iter()
        .filter(|t| {
            let stim = engine.stimulus_grid()[t.stim_index];
            (0.5..=5.0).contains(&stim.freq_cpd)
        })
        .count();

    if low_freq_trials < 2 {
        if theta.f > 4.5 {
            theta.f = theta.f.min(4.5);
            guard_applied.push("few low-frequency trials: biased f down toward 4.5 cpd".to_string());
        }
        if theta.b < 1.35 {
            theta.b = theta.b.max(1.35);
            guard_applied.push("few low-frequency trials: biased b up toward 1.35".to_string());
        }
        if theta.d < 1.8 {
            theta.d = theta.d.max(1.8);
            guard_applied.push("few low-frequency trials: biased d up toward 1.8".to_string());
        }
    }

    if theta.f > 10.0 {
        theta.f = 10.0;
        guard_applied.push("clamped f to <= 10.0 cpd".to_string());
    }
    if theta.b < 1.15 {
        theta.b = 1.15;
        guard_applied.push("clamped b to >= 1.15".to_string());
    }
    if theta.d < 1.4 {
        theta.d = 1.4;
        guard_applied.push("clamped d to >= 1.4".to_string());
    }

    for _ in 0..5 {
        let cutoff = find_cutoff_freq(engine, *theta);
        if cutoff <= 42.0 {
            break;
        }
        theta.f = (0.9 * theta.f).max(2.2);
        theta.b = (theta.b + 0.12).min(2.8);
        theta.d = (theta.d + 0.15).min(3.2);
        guard_applied.push(format!("shrank parameters: estimated cutoff {cutoff:.1} cpd exceeded 42 cpd"));
    }
}

fn rank_from_aulcsf(aulcsf: f64) -> &'static str {
    if aulcsf > 2.0 {
        "SUPERIOR"
    } else if aulcsf > 1.6 {
        "ABOVE AVERAGE"
    } else if aulcsf > 1.2 {
        "NORMAL"
    } else if aulcsf > 0.8 {
        "BELOW AVERAGE"
    } else {
        "IMPAIRED"
    }
}

/// Lowest frequency where the CSF curve crosses `logS = 0`, found by
/// linear interpolation in log-frequency space. If the curve never
/// crosses zero within the searched range, returns the 60 cpd ceiling.
fn find_cutoff_freq(engine: &QcsfEngine, theta: ParamPoint) -> f64 {
    const SAMPLE_COUNT: usize = 2000;
    let freqs = logspace(-1.0, 2.0, SAMPLE_COUNT); // 0.1 to 100 cpd

    let mut prev_freq = freqs[0];
    let mut prev_val = engine.evaluate_csf(prev_freq, theta);

    for &freq in freqs.iter().skip(1) {
        let val = engine.evaluate_csf(freq, theta);
        if prev_val > 0.0 && val <= 0.0 {
            let log_prev = prev_freq.log10();
            let log_cur = freq.log10();
            let frac = prev_val / (prev_val - val);
            let log_cutoff = log_prev + frac * (log_cur - log_prev);
            return 10f64.powf(log_cutoff).min(60.0);
        }
        prev_freq = freq;
        prev_val = val;
    }
    60.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qcsf_engine::EngineConfig;

    #[test]
    fn rank_buckets_match_spec_thresholds() {
        assert_eq!(rank_from_aulcsf(2.5), "SUPERIOR");
        assert_eq!(rank_from_aulcsf(1.8), "ABOVE AVERAGE");
        assert_eq!(rank_from_aulcsf(1.4), "NORMAL");
        assert_eq!(rank_from_aulcsf(1.0), "BELOW AVERAGE");
        assert_eq!(rank_from_aulcsf(0.1), "IMPAIRED");
    }

    #[test]
    fn snellen_cutoff_is_clamped_to_60_cpd_ceiling() {
        let engine = QcsfEngine::new(EngineConfig::default()).unwrap();
        // An extremely broad, never-crossing CSF should clamp to the 60 cpd ceiling.
        let theta = ParamPoint { g: 2.8, f: 18.0, b: 6.0, d: 0.0 };
        let cutoff = find_cutoff_freq(&engine, theta);
        assert!(cutoff > 0.0 && cutoff <= 60.0);
    }

    #[test]
    fn derive_produces_finite_result_for_default_engine() {
        let engine = QcsfEngine::new(EngineConfig::default()).unwrap();
        let result = derive(&engine, &ResultConfig::default());
        assert!(result.aulcsf >= 0.0);
        assert!(result.snellen.starts_with("20/"));
        assert_eq!(result.landmarks.len(), default_landmarks().len());
    }

    #[test]
    fn guard_can_be_disabled() {
        let engine = QcsfEngine::new(EngineConfig::default()).unwrap();
        let config = ResultConfig { apply_plausibility_guard: false, ..Default::default() };
        let result = derive(&engine, &config);
        assert!(result.guard_applied.is_empty());
    }

    /// `SessionResult` is the crate's hand-off type to an embedder; it must
    /// survive a JSON round trip intact since that is how a caller out of
    /// process (a pairing/display layer, per spec.md §1) would receive it.
    #[test]
    fn session_result_round_trips_through_json() {
        let engine = QcsfEngine::new(EngineConfig::default()).unwrap();
        let result = derive(&engine, &ResultConfig::default());

        let json = serde_json::to_string(&result).expect("SessionResult must serialize");
        let parsed: SessionResult = serde_json::from_str(&json).expect("round trip must parse");

        assert_eq!(parsed.rank, result.rank);
        assert_eq!(parsed.snellen, result.snellen);
        assert_eq!(parsed.landmarks.len(), result.landmarks.len());
        assert!((parsed.aulcsf - result.aulcsf).abs() < 1e-12);
    }
}
