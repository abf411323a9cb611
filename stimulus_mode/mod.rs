//! Stimulus modes: the polymorphic collaborator binding a stimulus
//! family (Gabor / tumbling-E / Sloan) to rendering and answer checking.
//!
//! A tagged enum dispatches to per-family state, per spec.md §9's
//! explicit guidance to avoid an inheritance hierarchy here.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::calibration::Calibration;
use crate::error::QcsfError;
use crate::optotypes::tumbling_e::{Direction, TumblingETemplates};
use crate::optotypes::sloan::SloanTemplates;
use crate::optotypes::{DEFAULT_DELTA_OCT, DEFAULT_FC};
use crate::rendering::filtered_letter::draw_filtered_letter;
use crate::rendering::gabor::{draw_gabor, GaborParams};
use crate::types::Stimulus;

const GABOR_ANGLES_DEG: [f64; 4] = [0.0, 45.0, 90.0, 135.0];
const GABOR_SLOPE: f64 = 3.5;
const TUMBLING_E_SLOPE: f64 = 3.5;
const SLOAN_SLOPE: f64 = 4.05;

/// The response key an observer can never correctly answer "yes" with
/// in `GaborYesNo` mode, since a target is always presented.
pub const NO_TARGET_KEY: &str = "no_target";

fn orientation_label(angle_deg: f64) -> String {
    format!("{}", angle_deg as i32)
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Right => "right",
        Direction::Down => "down",
        Direction::Left => "left",
        Direction::Up => "up",
    }
}

/// A stimulus mode: one of four families, each with its own ground-truth
/// sampling, rendering, and answer checking.
pub enum StimulusMode {
    Gabor4Afc(GroundTruthState),
    GaborYesNo(GroundTruthState),
    TumblingE(TumblingEState),
    Sloan(SloanState),
}

#[derive(Default)]
pub struct GroundTruthState {
    last_ground_truth: Option<String>,
}

#[derive(Default)]
pub struct TumblingEState {
    last_ground_truth: Option<Direction>,
    templates: Option<TumblingETemplates>,
}

#[derive(Default)]
pub struct SloanState {
    last_ground_truth: Option<char>,
    templates: Option<SloanTemplates>,
}

impl StimulusMode {
    pub fn gabor_4afc() -> Self {
        StimulusMode::Gabor4Afc(GroundTruthState::default())
    }

    pub fn gabor_yes_no() -> Self {
        StimulusMode::GaborYesNo(GroundTruthState::default())
    }

    pub fn tumbling_e() -> Self {
        StimulusMode::TumblingE(TumblingEState::default())
    }

    pub fn sloan() -> Self {
        StimulusMode::Sloan(SloanState::default())
    }

    /// Generates templates once per session. No-op for the Gabor
    /// variants, which render analytically.
    pub fn prepare(&mut self, template_resolution: usize) -> Result<(), QcsfError> {
        match self {
            StimulusMode::Gabor4Afc(_) | StimulusMode::GaborYesNo(_) => Ok(()),
            StimulusMode::TumblingE(state) => {
                state.templates = Some(TumblingETemplates::build(template_resolution, DEFAULT_FC, DEFAULT_DELTA_OCT)?);
                Ok(())
            }
            StimulusMode::Sloan(state) => {
                state.templates = Some(SloanTemplates::build(template_resolution, DEFAULT_FC, DEFAULT_DELTA_OCT)?);
                Ok(())
            }
        }
    }

    pub fn num_afc(&self) -> u8 {
        match self {
            StimulusMode::Gabor4Afc(_) => 4,
            StimulusMode::GaborYesNo(_) => 1,
            StimulusMode::TumblingE(_) => 4,
            StimulusMode::Sloan(_) => 10,
        }
    }

    pub fn psychometric_slope(&self) -> f64 {
        match self {
            StimulusMode::Gabor4Afc(_) | StimulusMode::GaborYesNo(_) => GABOR_SLOPE,
            StimulusMode::TumblingE(_) => TUMBLING_E_SLOPE,
            StimulusMode::Sloan(_) => SLOAN_SLOPE,
        }
    }

    /// Valid response keys for this mode.
    pub fn labels(&self) -> Vec<String> {
        match self {
            StimulusMode::Gabor4Afc(_) => GABOR_ANGLES_DEG.iter().map(|a| orientation_label(*a)).collect(),
            StimulusMode::GaborYesNo(_) => {
                let mut labels: Vec<String> = GABOR_ANGLES_DEG.iter().map(|a| orientation_label(*a)).collect();
                labels.push(NO_TARGET_KEY.to_string());
                labels
            }
            StimulusMode::TumblingE(_) => Direction::ALL.iter().map(|d| direction_label(*d).to_string()).collect(),
            StimulusMode::Sloan(_) => crate::optotypes::sloan::LETTERS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Renders the next stimulus, sampling and remembering the
    /// ground-truth label, and returns it.
    pub fn render(
        &mut self,
        frame: &mut [u8],
        w: usize,
        h: usize,
        stim: Stimulus,
        calibration: &Calibration,
        rng: &mut ChaCha8Rng,
    ) -> Result<String, QcsfError> {
        match self {
            StimulusMode::Gabor4Afc(state) | StimulusMode::GaborYesNo(state) => {
                let angle_deg = GABOR_ANGLES_DEG[rng.gen_range(0..GABOR_ANGLES_DEG.len())];
                let params = GaborParams {
                    cpd: stim.freq_cpd,
                    contrast: stim.contrast(),
                    angle_rad: angle_deg.to_radians(),
                };
                draw_gabor(frame, w, h, params, calibration)?;
                let label = orientation_label(angle_deg);
                state.last_ground_truth = Some(label.clone());
                Ok(label)
            }
            StimulusMode::TumblingE(state) => {
                let templates = state.templates.as_ref().ok_or_else(|| QcsfError::Precondition {
                    message: "TumblingE::prepare() must be called before render()".to_string(),
                })?;
                let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
                let template = templates.get(direction);
                draw_filtered_letter(frame, w, h, template, DEFAULT_FC, stim.freq_cpd, stim.contrast(), calibration)?;
                state.last_ground_truth = Some(direction);
                Ok(direction_label(direction).to_string())
            }
            StimulusMode::Sloan(state) => {
                let templates = state.templates.as_ref().ok_or_else(|| QcsfError::Precondition {
                    message: "Sloan::prepare() must be called before render()".to_string(),
                })?;
                let letters = crate::optotypes::sloan::LETTERS;
                let letter = letters[rng.gen_range(0..letters.len())];
                let template = templates.get(letter).ok_or_else(|| QcsfError::Configuration {
                    message: format!("missing template for letter {letter}"),
                })?;
                draw_filtered_letter(frame, w, h, template, DEFAULT_FC, stim.freq_cpd, stim.contrast(), calibration)?;
                state.last_ground_truth = Some(letter);
                Ok(letter.to_string())
            }
        }
    }

    /// Compares `response` against the last remembered ground-truth
    /// label. `GaborYesNo`'s `NO_TARGET_KEY` is always wrong, since a
    /// target is always presented.
    pub fn check(&self, response: &str) -> bool {
        match self {
            StimulusMode::Gabor4Afc(state) => state.last_ground_truth.as_deref() == Some(response),
            StimulusMode::GaborYesNo(state) => {
                response != NO_TARGET_KEY && state.last_ground_truth.as_deref() == Some(response)
            }
            StimulusMode::TumblingE(state) => {
                state.last_ground_truth.map(direction_label) == Some(response)
            }
            StimulusMode::Sloan(state) => state.last_ground_truth.map(|c| c.to_string().eq_ignore_ascii_case(response)).unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn calibration() -> Calibration {
        Calibration::new(5.0, 1000.0, 128, false).unwrap()
    }

    fn stim() -> Stimulus {
        Stimulus { freq_cpd: 4.0, log_contrast: -0.3 }
    }

    #[test]
    fn gabor4afc_check_matches_only_rendered_label() {
        let mut mode = StimulusMode::gabor_4afc();
        mode.prepare(32).unwrap();
        let mut frame = vec![0u8; 4 * 128 * 128];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let truth = mode.render(&mut frame, 128, 128, stim(), &calibration(), &mut rng).unwrap();

        assert!(mode.check(&truth));
        for &angle in GABOR_ANGLES_DEG.iter() {
            let label = orientation_label(angle);
            if label != truth {
                assert!(!mode.check(&label));
            }
        }
    }

    #[test]
    fn gabor_yes_no_no_target_is_always_wrong() {
        let mut mode = StimulusMode::gabor_yes_no();
        let mut frame = vec![0u8; 4 * 64 * 64];
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let _truth = mode.render(&mut frame, 64, 64, stim(), &calibration(), &mut rng).unwrap();
        assert!(!mode.check(NO_TARGET_KEY));
    }

    #[test]
    fn tumbling_e_requires_prepare_before_render() {
        let mut mode = StimulusMode::tumbling_e();
        let mut frame = vec![0u8; 4 * 64 * 64];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(mode.render(&mut frame, 64, 64, stim(), &calibration(), &mut rng).is_err());
    }

    #[test]
    fn tumbling_e_check_matches_rendered_direction() {
        let mut mode = StimulusMode::tumbling_e();
        mode.prepare(32).unwrap();
        let mut frame = vec![0u8; 4 * 96 * 96];
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let truth = mode.render(&mut frame, 96, 96, stim(), &calibration(), &mut rng).unwrap();
        assert!(mode.check(&truth));
        for &direction in Direction::ALL.iter() {
            let label = direction_label(direction);
            if label != truth {
                assert!(!mode.check(label));
            }
        }
    }

    #[test]
    fn sloan_check_matches_rendered_letter() {
        let mut mode = StimulusMode::sloan();
        mode.prepare(32).unwrap();
        let mut frame = vec![0u8; 4 * 96 * 96];
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let truth = mode.render(&mut frame, 96, 96, stim(), &calibration(), &mut rng).unwrap();
        assert!(mode.check(&truth));
        for letter in crate::optotypes::sloan::LETTERS.iter() {
            if letter.to_string() != truth {
                assert!(!mode.check(&letter.to_string()));
            }
        }
    }

    #[test]
    fn label_lists_match_num_afc() {
        assert_eq!(StimulusMode::gabor_4afc().labels().len(), 4);
        assert_eq!(StimulusMode::gabor_yes_no().labels().len(), 5); // 4 orientations + no_target
        assert_eq!(StimulusMode::tumbling_e().labels().len(), 4);
        assert_eq!(StimulusMode::sloan().labels().len(), 10);
    }
}
